//! Replicated sequence core
//!
//! Identifiers, elements and the RGA-style sequence that text objects are
//! built on. Nothing here knows about documents or transactions: the
//! sequence accepts already-identified inserts and deletes and guarantees
//! that any two replicas holding the same elements show the same order.
//!
//! # References
//!
//! - "Replicated abstract data types: Building blocks for collaborative
//!   applications" (Roh et al., RGA)
//! - "A comprehensive study of CRDTs" by Marc Shapiro et al.

pub mod element;
pub mod id;
pub mod sequence;

pub use element::{Attributes, Element, Payload};
pub use id::{ObjId, OpId};
pub use sequence::{Sequence, Visible};
