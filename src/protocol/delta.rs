//! Delta protocol: retain / insert / delete operations for editor widgets
//!
//! The format is the one rich-text editors such as Quill exchange:
//!
//! ```json
//! { "ops": [ { "retain": 6 }, { "insert": "reader", "attributes": { "bold": true } }, { "delete": 5 } ] }
//! ```
//!
//! Reading a text produces a delta made only of attributed inserts.
//! Applying a delta walks a running offset over the text's visible
//! elements, counting control markers as positions.
//!
//! Every attributed insert is wrapped in its own open/close control pair.

use crate::crdt::{Attributes, Payload};
use crate::error::{Result, TextError};
use crate::text::{accumulate, EditText, Text};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// Insert `insert` with optional formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertOp {
    pub insert: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

impl InsertOp {
    /// Create an insert; empty attributes are dropped
    pub fn new(insert: String, attributes: Attributes) -> Self {
        Self {
            insert,
            attributes: (!attributes.is_empty()).then_some(attributes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteOp {
    pub delete: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetainOp {
    pub retain: usize,
}

/// One delta operation
///
/// Anything that is not recognisably an insert, delete or retain is kept
/// as [`DeltaOp::Unknown`] and skipped when applying, so newer producers
/// can add op kinds without breaking older consumers.
///
/// Variants are tried in declaration order, so an op carrying several
/// keys resolves as retain, then delete, then insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeltaOp {
    Retain(RetainOp),
    Delete(DeleteOp),
    Insert(InsertOp),
    Unknown(Value),
}

/// A list of delta operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub ops: Vec<DeltaOp>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a text as attributed inserts
    ///
    /// # Example
    ///
    /// ```rust
    /// use serde_json::json;
    /// use synckit_richtext::{Delta, EditText, Payload, Text};
    ///
    /// let mut text = Text::from("Gandalf the Grey");
    /// text.insert_at(0, [Payload::control([("bold", json!(true))])]).unwrap();
    /// text.insert_at(8, [Payload::control([("bold", json!(null))])]).unwrap();
    ///
    /// assert_eq!(
    ///     Delta::from_text(&text).to_value(),
    ///     json!({"ops": [
    ///         {"insert": "Gandalf", "attributes": {"bold": true}},
    ///         {"insert": " the Grey"},
    ///     ]})
    /// );
    /// ```
    pub fn from_text(text: &Text) -> Self {
        Self {
            ops: accumulate(text.to_spans())
                .into_iter()
                .map(DeltaOp::Insert)
                .collect(),
        }
    }

    /// Append a retain
    pub fn retain(mut self, count: usize) -> Self {
        self.ops.push(DeltaOp::Retain(RetainOp { retain: count }));
        self
    }

    /// Append a delete
    pub fn delete(mut self, count: usize) -> Self {
        self.ops.push(DeltaOp::Delete(DeleteOp { delete: count }));
        self
    }

    /// Append an unformatted insert
    pub fn insert(mut self, text: impl Into<String>) -> Self {
        self.ops.push(DeltaOp::Insert(InsertOp::new(text.into(), Attributes::new())));
        self
    }

    /// Append a formatted insert
    pub fn insert_with(mut self, text: impl Into<String>, attributes: Attributes) -> Self {
        self.ops.push(DeltaOp::Insert(InsertOp::new(text.into(), attributes)));
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// JSON value form; cannot fail since every field is plain JSON
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Same keys, every value `null`: closes what `attributes` opened
pub fn inverse_attributes(attributes: &Attributes) -> Attributes {
    attributes
        .keys()
        .map(|name| (name.clone(), Value::Null))
        .collect()
}

/// Apply `delta` to `target`, starting at offset 0
///
/// - `retain(n)` moves the offset by `n`.
/// - `delete(n)` removes `n` elements at the offset; the offset stays.
/// - `insert(s)` inserts one element per `char` at the offset. When an
///   attribute map is present (even an empty one), it is inserted before
///   the run and its inverse after it. The offset moves past everything
///   inserted.
/// - Unknown ops are ignored.
///
/// # Errors
///
/// `TextError::IndexOutOfRange` if the delta addresses past the end of
/// the text or its offset overflows `usize`.
/// `TextError::ModificationOutsideScope` if `target` is an attached text
/// outside a transaction. Ops before the failing one stay applied to the
/// working text.
pub fn apply_delta<T: EditText>(target: &mut T, delta: &Delta) -> Result<()> {
    let mut offset = 0;

    for op in &delta.ops {
        match op {
            DeltaOp::Retain(retain) => offset = advance(target, offset, retain.retain)?,
            DeltaOp::Delete(delete) => target.delete_at(offset, delete.delete)?,
            DeltaOp::Insert(insert) => {
                if insert.insert.is_empty() {
                    continue;
                }
                let attributes = insert.attributes.as_ref();

                if let Some(attrs) = attributes {
                    target.insert_at(offset, [Payload::Control(attrs.clone())])?;
                    offset = advance(target, offset, 1)?;
                }

                target.insert_str(offset, &insert.insert)?;
                offset = advance(target, offset, insert.insert.chars().count())?;

                if let Some(attrs) = attributes {
                    target.insert_at(offset, [Payload::Control(inverse_attributes(attrs))])?;
                    offset = advance(target, offset, 1)?;
                }
            }
            DeltaOp::Unknown(value) => trace!(?value, "skipping unrecognized delta op"),
        }
    }

    Ok(())
}

fn advance<T: EditText>(target: &T, offset: usize, by: usize) -> Result<usize> {
    offset.checked_add(by).ok_or(TextError::IndexOutOfRange {
        index: usize::MAX,
        length: target.len(),
    })
}
