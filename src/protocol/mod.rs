//! Wire formats
//!
//! - [`delta`]: the retain/insert/delete delta protocol used by rich-text
//!   editor widgets, with the encoder and applier for [`Text`](crate::Text)
//! - [`serialize`]: JSON encoding of change records for exchange between
//!   replicas

pub mod delta;
pub mod serialize;

pub use delta::{apply_delta, inverse_attributes, DeleteOp, Delta, DeltaOp, InsertOp, RetainOp};
pub use serialize::{decode_change, decode_changes, encode_change, encode_changes};
