//! OpId: Unique identifier for operations, elements and text objects
//!
//! Each operation in a document has a unique ID composed of:
//! - Counter: Lamport timestamp assigned when the op was created
//! - Actor: Identifies the replica that created the op
//!
//! The id of an insert op doubles as the id of the element it creates,
//! and the id of a text-creation op doubles as the object id.

use crate::ActorId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Unique identifier for an operation
///
/// Ordered by counter first, then by actor id. Two ops can only share a
/// counter if they were created concurrently by different actors, so the
/// actor comparison is the deterministic tie-break every replica agrees on.
///
/// # Example
///
/// ```rust
/// use synckit_richtext::OpId;
///
/// let id1 = OpId::new(1, "alice".to_string());
/// let id2 = OpId::new(1, "bob".to_string());
/// let id3 = OpId::new(2, "alice".to_string());
///
/// // Same counter → ordered by actor
/// assert!(id1 < id2);
///
/// // Higher counter → comes after
/// assert!(id3 > id2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId {
    /// Lamport counter at creation time
    pub counter: u64,

    /// Replica that created this op
    pub actor: ActorId,
}

/// Text objects are identified by the op that created them
pub type ObjId = OpId;

impl OpId {
    /// Create a new op id
    pub fn new(counter: u64, actor: ActorId) -> Self {
        Self { counter, actor }
    }
}

impl Ord for OpId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.counter
            .cmp(&other.counter)
            .then_with(|| self.actor.cmp(&other.actor))
    }
}

impl PartialOrd for OpId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for OpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.counter, self.actor)
    }
}
