//! Change records: the unit of replication
//!
//! A [`Change`] is everything one transaction did, as a list of
//! operations with consecutive ids. Replicas exchange changes and apply
//! them in causal order.

use crate::crdt::{ObjId, OpId, Payload};
use crate::sync::VectorClock;
use crate::ActorId;
use serde::{Deserialize, Serialize};

/// A single operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Op {
    pub id: OpId,
    pub action: OpAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OpAction {
    /// Create a text object under a root key; the object id is the op id
    MakeText { key: String },

    /// Insert `value` after `pred` (`None` = head) in `obj`; the element
    /// id is the op id
    Insert {
        obj: ObjId,
        pred: Option<OpId>,
        value: Payload,
    },

    /// Tombstone `elem` in `obj`
    Delete { obj: ObjId, elem: OpId },
}

/// Operations produced by one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub actor: ActorId,

    /// Per-actor change number, starting at 1
    pub seq: u64,

    /// Counter of the first op; the rest follow consecutively
    pub start_op: u64,

    /// Document clock at the time the change was made
    pub deps: VectorClock,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub ops: Vec<Op>,
}

impl Change {
    /// Counter of the last op in this change
    pub fn max_op(&self) -> u64 {
        self.ops
            .iter()
            .map(|op| op.id.counter)
            .max()
            .unwrap_or(self.start_op)
    }
}
