//! Transactions: the only place attached texts can be mutated

use super::change::{Op, OpAction};
use super::Document;
use crate::crdt::{ObjId, OpId, Payload};
use crate::error::{Result, TextError};
use crate::sync::LamportClock;
use crate::text::{EditText, Text, TextMut};
use crate::ActorId;

/// Records the ops produced by [`TextMut`] edits
///
/// Borrows the transaction's clock and op list, so handles cannot escape
/// the closure passed to [`Document::change`].
pub(crate) struct OpSink<'a> {
    actor: &'a ActorId,
    clock: &'a mut LamportClock,
    ops: &'a mut Vec<Op>,
}

impl OpSink<'_> {
    pub(crate) fn next_id(&mut self) -> OpId {
        OpId::new(self.clock.tick(), self.actor.clone())
    }

    pub(crate) fn insert(&mut self, id: OpId, obj: ObjId, pred: Option<OpId>, value: Payload) {
        self.ops.push(Op {
            id,
            action: OpAction::Insert { obj, pred, value },
        });
    }

    pub(crate) fn delete(&mut self, id: OpId, obj: ObjId, elem: OpId) {
        self.ops.push(Op {
            id,
            action: OpAction::Delete { obj, elem },
        });
    }
}

/// Working copy handed to a [`Document::change`] closure
pub struct Transaction {
    doc: Document,
    ops: Vec<Op>,
}

impl Transaction {
    pub(crate) fn new(doc: Document) -> Self {
        Self {
            doc,
            ops: Vec::new(),
        }
    }

    pub(crate) fn into_parts(self) -> (Document, Vec<Op>) {
        (self.doc, self.ops)
    }

    pub fn actor(&self) -> &ActorId {
        &self.doc.actor
    }

    /// Attach `text` under `key` and return a handle to the attached copy
    ///
    /// Records one creation op and then one insert op per payload of
    /// `text`. A text already under `key` is replaced in the root but
    /// remains addressable by ops that reference it.
    pub fn set_text(&mut self, key: impl Into<String>, text: Text) -> Result<TextMut<'_>> {
        let key = key.into();
        let obj = OpId::new(self.doc.max_op.tick(), self.doc.actor.clone());

        self.ops.push(Op {
            id: obj.clone(),
            action: OpAction::MakeText { key: key.clone() },
        });
        self.doc
            .objects
            .insert(obj.clone(), Text::attached(obj.clone()));
        self.doc.root.insert(key.clone(), obj.clone());

        let payloads: Vec<Payload> = text.iter().cloned().collect();
        let mut handle = self
            .text_mut(&key)
            .ok_or(TextError::UnknownReference(obj))?;
        handle.insert_at(0, payloads)?;
        Ok(handle)
    }

    /// Current state of the text under `key`, including this
    /// transaction's edits so far
    pub fn text(&self, key: &str) -> Option<&Text> {
        self.doc.text(key)
    }

    /// Mutable handle to the text under `key`
    pub fn text_mut(&mut self, key: &str) -> Option<TextMut<'_>> {
        let Document {
            actor,
            max_op,
            root,
            objects,
            ..
        } = &mut self.doc;

        let obj = root.get(key)?;
        let text = objects.get_mut(obj)?;
        let sink = OpSink {
            actor,
            clock: max_op,
            ops: &mut self.ops,
        };
        Some(TextMut::new(text, sink))
    }

    /// Number of ops recorded so far
    pub fn op_count(&self) -> usize {
        self.ops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_text_records_creation_and_inserts() {
        let mut tx = Transaction::new(Document::with_actor("alice"));
        let handle = tx.set_text("text", Text::from("ab")).unwrap();
        assert_eq!(handle.to_string(), "ab");

        let (_, ops) = tx.into_parts();
        assert_eq!(ops.len(), 3);
        assert!(matches!(&ops[0].action, OpAction::MakeText { key } if key == "text"));
        assert_eq!(ops[0].id, OpId::new(1, "alice".to_string()));

        match &ops[2].action {
            OpAction::Insert { obj, pred, value } => {
                assert_eq!(obj, &ops[0].id);
                assert_eq!(pred.as_ref(), Some(&ops[1].id));
                assert_eq!(value, &Payload::Char('b'));
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_handles_share_state() {
        let mut tx = Transaction::new(Document::with_actor("alice"));
        tx.set_text("text", Text::new()).unwrap();

        tx.text_mut("text").unwrap().insert_str(0, "hi").unwrap();
        tx.text_mut("text")
            .unwrap()
            .insert_at(2, [Payload::control([("bold", json!(true))])])
            .unwrap();

        let text = tx.text("text").unwrap();
        assert_eq!(text.len(), 3);
        assert_eq!(text.to_string(), "hi");
        assert_eq!(tx.op_count(), 4);
    }

    #[test]
    fn test_delete_records_tombstone_ops() {
        let mut tx = Transaction::new(Document::with_actor("alice"));
        let mut text = tx.set_text("text", Text::from("abc")).unwrap();
        text.delete_at(0, 2).unwrap();
        assert_eq!(text.to_string(), "c");

        let (_, ops) = tx.into_parts();
        let deleted: Vec<&OpId> = ops
            .iter()
            .filter_map(|op| match &op.action {
                OpAction::Delete { elem, .. } => Some(elem),
                _ => None,
            })
            .collect();
        assert_eq!(deleted, vec![&ops[1].id, &ops[2].id]);
    }

    #[test]
    fn test_handle_bounds_leave_state_untouched() {
        let mut tx = Transaction::new(Document::with_actor("alice"));
        let mut text = tx.set_text("text", Text::from("ab")).unwrap();

        assert_eq!(
            text.insert_str(3, "x"),
            Err(TextError::IndexOutOfRange {
                index: 3,
                length: 2
            })
        );
        assert!(text.delete_at(1, 5).is_err());
        assert_eq!(text.to_string(), "ab");
        assert_eq!(tx.op_count(), 3);
    }

    #[test]
    fn test_missing_key() {
        let mut tx = Transaction::new(Document::new());
        assert!(tx.text("nope").is_none());
        assert!(tx.text_mut("nope").is_none());
    }
}
