//! SyncKit Rich Text - Replicated rich text with inline formatting
//!
//! A text is an ordered sequence of characters and formatting control
//! markers, edited concurrently by any number of replicas without a
//! coordinator. Replicas converge to the same visible text regardless of
//! the order in which they receive each other's changes.
//!
//! It implements:
//! - Replicated sequence (RGA) with tombstone deletion
//! - Formatting as inline control elements
//! - Span flattening and attribute accumulation
//! - Retain/insert/delete delta conversion for editor widgets
//! - Scoped mutation with change records and causal delivery
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use synckit_richtext::{Delta, Document, Span, Text};
//!
//! let (doc, _) = Document::new()
//!     .change(|tx| {
//!         let mut text = tx.set_text("text", Text::from("Hello world"))?;
//!         let mut bold = serde_json::Map::new();
//!         bold.insert("bold".to_string(), json!(true));
//!         text.apply_delta(&Delta::new().retain(6).insert_with("reader", bold).delete(5))
//!     })
//!     .unwrap();
//!
//! let text = doc.text("text").unwrap();
//! assert_eq!(text.to_string(), "Hello reader");
//! assert_eq!(
//!     text.to_spans().collect::<Vec<_>>(),
//!     vec![
//!         Span::from("Hello "),
//!         Span::control([("bold", json!(true))]),
//!         Span::from("reader"),
//!         Span::control([("bold", json!(null))]),
//!     ]
//! );
//! ```

pub mod crdt;
pub mod document;
pub mod error;
pub mod protocol;
pub mod sync;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use crdt::{Attributes, Element, ObjId, OpId, Payload, Sequence};
pub use document::{Change, Document, Op, OpAction, Transaction};
pub use error::{Result, TextError};
pub use protocol::{apply_delta, Delta, DeltaOp, InsertOp};
pub use sync::{LamportClock, VectorClock};
pub use text::{accumulate, AttributeStack, EditText, Span, Spans, Text, TextMut};

/// Replica identifier type
pub type ActorId = String;
