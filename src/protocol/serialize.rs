//! Serialization layer - Convert change records to/from JSON
//!
//! Change records are what replicas exchange to merge. Transport is the
//! caller's business; these helpers only turn changes into bytes and back.

use crate::document::Change;
use crate::error::Result;

/// Serialize a batch of changes
pub fn encode_changes(changes: &[Change]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(changes)?)
}

/// Deserialize a batch of changes
pub fn decode_changes(bytes: &[u8]) -> Result<Vec<Change>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Serialize a single change
pub fn encode_change(change: &Change) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(change)?)
}

/// Deserialize a single change
pub fn decode_change(bytes: &[u8]) -> Result<Change> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TextError;
    use crate::text::EditText;
    use crate::{Document, Payload, Text};
    use serde_json::json;

    #[test]
    fn test_change_round_trip_replays() {
        let (doc, change) = Document::with_actor("alice")
            .change(|tx| {
                let mut text = tx.set_text("text", Text::from("hi"))?;
                text.insert_at(2, [Payload::control([("bold", json!(true))])])?;
                text.delete_one(0)?;
                Ok(())
            })
            .unwrap();
        let change = change.unwrap();

        let bytes = encode_change(&change).unwrap();
        let decoded = decode_change(&bytes).unwrap();
        assert_eq!(decoded, change);

        let replica = Document::with_actor("bob").apply_changes(vec![decoded]).unwrap();
        assert_eq!(replica.text("text"), doc.text("text"));
    }

    #[test]
    fn test_batch_round_trip() {
        let doc = Document::from_texts([("a", Text::from("x")), ("b", Text::from("y"))]).unwrap();
        let changes = doc.get_changes(&Document::new());

        let decoded = decode_changes(&encode_changes(&changes).unwrap()).unwrap();
        assert_eq!(decoded, changes);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_changes(b"not json"),
            Err(TextError::Serialization(_))
        ));
    }
}
