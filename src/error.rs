//! Error types for rich-text operations

use crate::crdt::OpId;
use thiserror::Error;

/// Errors returned by text, sequence and document operations
///
/// Every error is local to the call that produced it: the text or
/// document it was invoked on is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    /// Index (or the end of a range) lies outside the visible elements
    #[error("index {index} out of range (length: {length})")]
    IndexOutOfRange { index: usize, length: usize },

    /// Mutation attempted on an attached text without an open transaction
    #[error("text object cannot be modified outside of a change block")]
    ModificationOutsideScope,

    /// An operation referenced an element or object that was never observed
    #[error("unknown reference: {0}")]
    UnknownReference(OpId),

    /// Encoding or decoding of a change record or delta failed
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TextError {
    fn from(err: serde_json::Error) -> Self {
        TextError::Serialization(err.to_string())
    }
}

/// Result type for rich-text operations
pub type Result<T> = std::result::Result<T, TextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TextError::IndexOutOfRange {
            index: 7,
            length: 3,
        };
        assert_eq!(err.to_string(), "index 7 out of range (length: 3)");

        let err = TextError::UnknownReference(OpId::new(4, "alice".to_string()));
        assert_eq!(err.to_string(), "unknown reference: 4@alice");

        assert!(TextError::ModificationOutsideScope
            .to_string()
            .contains("outside of a change block"));
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let converted: TextError = err.into();
        assert!(matches!(converted, TextError::Serialization(_)));
    }
}
