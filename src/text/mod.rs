//! Text: index-addressable view over a replicated sequence of payloads
//!
//! A [`Text`] holds characters and inline formatting controls. Indexes
//! count every visible element, so a control marker occupies a position
//! just like a character does, while [`Text::to_string`] renders only the
//! characters.
//!
//! # Lifecycle
//!
//! - **Detached**: built with `Text::new()` / `Text::from("...")` and not
//!   yet part of a document. Freely mutable through [`EditText`].
//! - **Attached**: lives inside a [`Document`](crate::Document). Reading
//!   works everywhere; mutation goes through a [`TextMut`] handle, which
//!   only a [`Transaction`](crate::Transaction) can hand out. Mutating an
//!   attached `Text` directly (for example a clone taken from a snapshot)
//!   fails with [`TextError::ModificationOutsideScope`].
//!
//! # Example
//!
//! ```rust
//! use synckit_richtext::{Document, EditText, Text};
//!
//! let (doc, _) = Document::new()
//!     .change(|tx| {
//!         let mut text = tx.set_text("text", Text::from("Hello"))?;
//!         text.insert_str(5, " world")?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(doc.text("text").unwrap().to_string(), "Hello world");
//! ```

pub mod attributes;
pub mod spans;

pub use attributes::{accumulate, AttributeStack};
pub use spans::{Span, Spans};

use crate::crdt::{ObjId, Payload, Sequence, Visible};
use crate::document::OpSink;
use crate::error::{Result, TextError};
use crate::protocol::Delta;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// Index-based editing shared by detached texts and transaction handles
///
/// The delta applier is written against this trait so it works on both.
pub trait EditText {
    /// Number of visible elements (characters and controls)
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert payloads before the element at `index`, or append when
    /// `index == len()`
    ///
    /// # Errors
    ///
    /// `TextError::IndexOutOfRange` if `index > len()`.
    fn insert_at<I, P>(&mut self, index: usize, payloads: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Payload>;

    /// Delete `count` consecutive visible elements starting at `index`
    ///
    /// # Errors
    ///
    /// `TextError::IndexOutOfRange` if the range runs past the end.
    fn delete_at(&mut self, index: usize, count: usize) -> Result<()>;

    /// Insert every `char` of `text` as its own element
    fn insert_str(&mut self, index: usize, text: &str) -> Result<()> {
        self.insert_at(index, text.chars())
    }

    fn delete_one(&mut self, index: usize) -> Result<()> {
        self.delete_at(index, 1)
    }
}

#[derive(Debug, Clone)]
enum TextState {
    Detached(Vec<Payload>),
    Attached { obj: ObjId, seq: Sequence<Payload> },
}

/// Replicated rich-text value
#[derive(Debug, Clone)]
pub struct Text {
    state: TextState,
}

impl Text {
    /// Create an empty, detached text
    pub fn new() -> Self {
        Self {
            state: TextState::Detached(Vec::new()),
        }
    }

    /// Empty text backed by a sequence, owned by a document
    pub(crate) fn attached(obj: ObjId) -> Self {
        Self {
            state: TextState::Attached {
                obj,
                seq: Sequence::new(),
            },
        }
    }

    pub(crate) fn sequence(&self) -> Option<&Sequence<Payload>> {
        match &self.state {
            TextState::Detached(_) => None,
            TextState::Attached { seq, .. } => Some(seq),
        }
    }

    pub(crate) fn sequence_mut(&mut self) -> Option<&mut Sequence<Payload>> {
        match &mut self.state {
            TextState::Detached(_) => None,
            TextState::Attached { seq, .. } => Some(seq),
        }
    }

    /// Object id, if this text is part of a document
    pub fn obj_id(&self) -> Option<&ObjId> {
        match &self.state {
            TextState::Detached(_) => None,
            TextState::Attached { obj, .. } => Some(obj),
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, TextState::Attached { .. })
    }

    /// Number of visible elements, characters and controls alike
    pub fn len(&self) -> usize {
        match &self.state {
            TextState::Detached(payloads) => payloads.len(),
            TextState::Attached { seq, .. } => seq.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payload at `index`
    ///
    /// # Errors
    ///
    /// `TextError::IndexOutOfRange` if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<&Payload> {
        let found = match &self.state {
            TextState::Detached(payloads) => payloads.get(index),
            TextState::Attached { seq, .. } => seq.get(index),
        };
        found.ok_or(TextError::IndexOutOfRange {
            index,
            length: self.len(),
        })
    }

    /// Visible payloads in order
    pub fn iter(&self) -> Payloads<'_> {
        let inner = match &self.state {
            TextState::Detached(payloads) => PayloadsInner::Detached(payloads.iter()),
            TextState::Attached { seq, .. } => PayloadsInner::Attached(seq.visible()),
        };
        Payloads { inner }
    }

    /// Visible characters only, controls skipped
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.iter().filter_map(Payload::as_char)
    }

    /// Characters joined by `separator`; controls are skipped
    pub fn join(&self, separator: &str) -> String {
        let mut out = String::new();
        for (i, ch) in self.chars().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            out.push(ch);
        }
        out
    }

    /// Flatten into text runs and standalone control markers
    pub fn to_spans(&self) -> Spans<'_> {
        Spans::new(self.iter())
    }

    /// Encode as a delta of attributed inserts
    pub fn to_delta(&self) -> Delta {
        Delta::from_text(self)
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::new()
    }
}

impl EditText for Text {
    fn len(&self) -> usize {
        Text::len(self)
    }

    fn insert_at<I, P>(&mut self, index: usize, payloads: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Payload>,
    {
        match &mut self.state {
            TextState::Attached { .. } => Err(TextError::ModificationOutsideScope),
            TextState::Detached(existing) => {
                if index > existing.len() {
                    return Err(TextError::IndexOutOfRange {
                        index,
                        length: existing.len(),
                    });
                }
                let tail = existing.split_off(index);
                existing.extend(payloads.into_iter().map(Into::into));
                existing.extend(tail);
                Ok(())
            }
        }
    }

    fn delete_at(&mut self, index: usize, count: usize) -> Result<()> {
        match &mut self.state {
            TextState::Attached { .. } => Err(TextError::ModificationOutsideScope),
            TextState::Detached(existing) => {
                let end = index.checked_add(count).unwrap_or(usize::MAX);
                if end > existing.len() {
                    return Err(TextError::IndexOutOfRange {
                        index: end,
                        length: existing.len(),
                    });
                }
                existing.drain(index..end);
                Ok(())
            }
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.chars() {
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

/// Texts compare by visible content
impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

/// Serializes as the plain character string
impl Serialize for Text {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        value.chars().collect()
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Text::from(value.as_str())
    }
}

impl From<Vec<char>> for Text {
    fn from(value: Vec<char>) -> Self {
        value.into_iter().collect()
    }
}

impl From<Vec<Payload>> for Text {
    fn from(value: Vec<Payload>) -> Self {
        Self {
            state: TextState::Detached(value),
        }
    }
}

impl FromIterator<char> for Text {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        iter.into_iter().map(Payload::Char).collect()
    }
}

impl FromIterator<Payload> for Text {
    fn from_iter<I: IntoIterator<Item = Payload>>(iter: I) -> Self {
        Text::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Iterator over the visible payloads of a [`Text`]
#[derive(Clone)]
pub struct Payloads<'a> {
    inner: PayloadsInner<'a>,
}

#[derive(Clone)]
enum PayloadsInner<'a> {
    Detached(std::slice::Iter<'a, Payload>),
    Attached(Visible<'a, Payload>),
}

impl<'a> Iterator for Payloads<'a> {
    type Item = &'a Payload;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            PayloadsInner::Detached(iter) => iter.next(),
            PayloadsInner::Attached(iter) => iter.next().map(|(_, payload)| payload),
        }
    }
}

/// Mutable handle to an attached text, valid for one transaction
///
/// Obtained from [`Transaction::set_text`](crate::Transaction::set_text)
/// or [`Transaction::text_mut`](crate::Transaction::text_mut). Every edit
/// is applied immediately and recorded as an operation in the
/// transaction's change. Reads go through `Deref<Target = Text>`.
pub struct TextMut<'a> {
    text: &'a mut Text,
    sink: OpSink<'a>,
}

impl<'a> TextMut<'a> {
    pub(crate) fn new(text: &'a mut Text, sink: OpSink<'a>) -> Self {
        Self { text, sink }
    }

    /// Apply a delta at this text
    pub fn apply_delta(&mut self, delta: &Delta) -> Result<()> {
        crate::protocol::apply_delta(self, delta)
    }
}

impl Deref for TextMut<'_> {
    type Target = Text;

    fn deref(&self) -> &Text {
        self.text
    }
}

impl EditText for TextMut<'_> {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn insert_at<I, P>(&mut self, index: usize, payloads: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Payload>,
    {
        let length = self.text.len();
        if index > length {
            return Err(TextError::IndexOutOfRange { index, length });
        }

        let (obj, seq) = match &mut self.text.state {
            TextState::Attached { obj, seq } => (obj, seq),
            TextState::Detached(_) => return self.text.insert_at(index, payloads),
        };

        let mut pred = match index {
            0 => None,
            _ => seq.id_at(index - 1).cloned(),
        };

        for payload in payloads {
            let payload = payload.into();
            let id = self.sink.next_id();
            seq.insert_after(pred.as_ref(), id.clone(), payload.clone())?;
            self.sink.insert(id.clone(), obj.clone(), pred, payload);
            pred = Some(id);
        }

        Ok(())
    }

    fn delete_at(&mut self, index: usize, count: usize) -> Result<()> {
        let (obj, seq) = match &mut self.text.state {
            TextState::Attached { obj, seq } => (obj, seq),
            TextState::Detached(_) => return self.text.delete_at(index, count),
        };

        for elem in seq.ids_in_range(index, count)? {
            seq.mark_deleted(&elem)?;
            let id = self.sink.next_id();
            self.sink.delete(id, obj.clone(), elem);
        }

        Ok(())
    }
}
