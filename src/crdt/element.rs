//! Element: The fundamental building block of the replicated sequence
//!
//! Each element carries:
//! - Unique ID (the id of the insert op that created it)
//! - The predecessor it was inserted after
//! - A payload: a single character or a formatting control
//! - Deleted flag (tombstone)

use super::id::OpId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Formatting attributes: attribute name → value
///
/// Inside a control payload a `null` value closes the attribute and any
/// other value opens it with that value.
pub type Attributes = serde_json::Map<String, Value>;

/// What a single sequence position holds
///
/// Serialized untagged: a character as a one-character string, a control
/// as a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// A visible character
    Char(char),

    /// An inline formatting marker; occupies a position but renders nothing
    Control(Attributes),
}

impl Payload {
    /// Build a control payload from `(name, value)` pairs
    ///
    /// ```rust
    /// use serde_json::json;
    /// use synckit_richtext::Payload;
    ///
    /// let open = Payload::control([("bold", json!(true))]);
    /// let close = Payload::control([("bold", json!(null))]);
    /// assert!(open.is_control() && close.is_control());
    /// ```
    pub fn control<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Payload::Control(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Payload::Char(ch) => Some(*ch),
            Payload::Control(_) => None,
        }
    }

    pub fn as_control(&self) -> Option<&Attributes> {
        match self {
            Payload::Char(_) => None,
            Payload::Control(attrs) => Some(attrs),
        }
    }

    pub fn is_control(&self) -> bool {
        matches!(self, Payload::Control(_))
    }
}

impl From<char> for Payload {
    fn from(ch: char) -> Self {
        Payload::Char(ch)
    }
}

impl From<Attributes> for Payload {
    fn from(attrs: Attributes) -> Self {
        Payload::Control(attrs)
    }
}

/// A single element of the replicated sequence
///
/// Elements are never removed once integrated; deletion only sets the
/// tombstone so that concurrent inserts referencing this element as a
/// predecessor still find their position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element<T> {
    /// Unique identifier for this element
    pub id: OpId,

    /// Element this was inserted after (None = head of the sequence)
    pub pred: Option<OpId>,

    /// The element's content
    pub value: T,

    /// Whether this element has been deleted
    pub deleted: bool,
}

impl<T> Element<T> {
    /// Create a new live element
    pub fn new(id: OpId, pred: Option<OpId>, value: T) -> Self {
        Self {
            id,
            pred,
            value,
            deleted: false,
        }
    }

    /// Mark this element as deleted, returning true if it was live
    pub fn delete(&mut self) -> bool {
        !std::mem::replace(&mut self.deleted, true)
    }

    pub fn is_visible(&self) -> bool {
        !self.deleted
    }
}
