//! Logical clocks for causality tracking
//!
//! - [`LamportClock`] hands out operation counters. Every op id is
//!   greater than the ids of everything the replica has already seen,
//!   which is what lets the sequence place concurrent inserts
//!   deterministically.
//! - [`VectorClock`] records how many changes from each actor a document
//!   has applied. Change records carry one as their dependency set.

use crate::ActorId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lamport timestamp for causality tracking
///
/// # Properties
///
/// - Monotonically increasing: clock never decreases
/// - Starts at 0 (no operation has counter 0)
/// - Update on merge: clock = max(local, remote)
///
/// # Example
///
/// ```rust
/// use synckit_richtext::LamportClock;
///
/// let mut clock = LamportClock::new();
/// assert_eq!(clock.tick(), 1);
///
/// clock.update(5); // Observed a remote op
/// assert_eq!(clock.tick(), 6);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LamportClock {
    value: u64,
}

impl LamportClock {
    /// Create a new Lamport clock starting at 0
    pub fn new() -> Self {
        Self { value: 0 }
    }

    /// Get the current clock value
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Increment clock and return new value (for local operations)
    pub fn tick(&mut self) -> u64 {
        self.value += 1;
        self.value
    }

    /// Update clock from a remote counter
    ///
    /// Sets clock to max(local, remote) to maintain causality
    pub fn update(&mut self, remote: u64) {
        self.value = self.value.max(remote);
    }
}

/// Number of changes applied per actor
///
/// Actors that are absent count as 0. Iteration order is by actor id, so
/// two equal clocks serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorClock {
    clocks: BTreeMap<ActorId, u64>,
}

impl VectorClock {
    /// Create an empty vector clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number of the last change applied from `actor`
    pub fn get(&self, actor: &str) -> u64 {
        self.clocks.get(actor).copied().unwrap_or(0)
    }

    /// Record `seq` for `actor`, never moving backwards
    pub fn update(&mut self, actor: &str, seq: u64) {
        let entry = self.clocks.entry(actor.to_string()).or_insert(0);
        *entry = (*entry).max(seq);
    }

    /// Component-wise maximum
    pub fn merge(&mut self, other: &VectorClock) {
        for (actor, &seq) in &other.clocks {
            self.update(actor, seq);
        }
    }

    /// True if every entry of `other` is covered by this clock
    pub fn dominates(&self, other: &VectorClock) -> bool {
        other
            .clocks
            .iter()
            .all(|(actor, &seq)| self.get(actor) >= seq)
    }

    /// Iterate `(actor, seq)` pairs in actor order
    pub fn iter(&self) -> impl Iterator<Item = (&ActorId, u64)> {
        self.clocks.iter().map(|(actor, &seq)| (actor, seq))
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }
}
