//! Document: immutable snapshots of a set of named texts
//!
//! Every public method takes `&self`. Edits happen inside
//! [`Document::change`], which runs a closure against a private working
//! copy and returns the new snapshot together with the [`Change`] it
//! produced. Replicas converge by exchanging changes
//! ([`Document::get_changes`] / [`Document::apply_changes`]) or by
//! merging whole documents ([`Document::merge`]).
//!
//! # Example
//!
//! ```rust
//! use synckit_richtext::{Document, EditText, Text};
//!
//! let base = Document::from_texts([("text", Text::new())]).unwrap();
//!
//! let (alice, _) = base
//!     .change(|tx| tx.text_mut("text").unwrap().insert_str(0, "abc"))
//!     .unwrap();
//! let bob = Document::with_actor("bob").merge(&base).unwrap();
//! let (bob, _) = bob
//!     .change(|tx| tx.text_mut("text").unwrap().insert_str(0, "xyz"))
//!     .unwrap();
//!
//! let left = alice.merge(&bob).unwrap();
//! let right = bob.merge(&alice).unwrap();
//! assert_eq!(left.text("text"), right.text("text"));
//! assert_eq!(left.text("text").unwrap().len(), 6);
//! ```

mod change;
mod transaction;

pub use change::{Change, Op, OpAction};
pub use transaction::Transaction;
pub(crate) use transaction::OpSink;

use crate::crdt::{ObjId, Payload, Sequence};
use crate::error::{Result, TextError};
use crate::sync::{LamportClock, VectorClock};
use crate::text::Text;
use crate::ActorId;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// A replica's view of a set of texts under root keys
#[derive(Debug, Clone)]
pub struct Document {
    actor: ActorId,

    /// Changes applied per actor
    clock: VectorClock,

    /// Highest op counter seen
    max_op: LamportClock,

    /// Root key -> winning text object
    root: BTreeMap<String, ObjId>,

    /// Every text object ever created, including ones that lost their key
    objects: HashMap<ObjId, Text>,

    /// Applied changes in application order
    history: Vec<Change>,

    /// Received changes whose dependencies are missing
    queue: Vec<Change>,
}

impl Document {
    /// Empty document with a random actor id
    pub fn new() -> Self {
        Self::with_actor(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn with_actor(actor: impl Into<ActorId>) -> Self {
        Self {
            actor: actor.into(),
            clock: VectorClock::new(),
            max_op: LamportClock::new(),
            root: BTreeMap::new(),
            objects: HashMap::new(),
            history: Vec::new(),
            queue: Vec::new(),
        }
    }

    /// New document whose first change attaches the given texts
    pub fn from_texts<I, K>(texts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Text)>,
        K: Into<String>,
    {
        let (doc, _) = Self::new().change(|tx| {
            for (key, text) in texts {
                tx.set_text(key, text)?;
            }
            Ok(())
        })?;
        Ok(doc)
    }

    /// Run `f` against a working copy and commit what it did
    ///
    /// Returns the new snapshot and the change record, or `None` when
    /// `f` recorded no operations. If `f` fails, its error is returned
    /// and nothing is committed.
    pub fn change<F>(&self, f: F) -> Result<(Document, Option<Change>)>
    where
        F: FnOnce(&mut Transaction) -> Result<()>,
    {
        self.commit(None, f)
    }

    /// Like [`Document::change`], attaching `message` to the change
    pub fn change_with_message<F>(
        &self,
        message: impl Into<String>,
        f: F,
    ) -> Result<(Document, Option<Change>)>
    where
        F: FnOnce(&mut Transaction) -> Result<()>,
    {
        self.commit(Some(message.into()), f)
    }

    fn commit<F>(&self, message: Option<String>, f: F) -> Result<(Document, Option<Change>)>
    where
        F: FnOnce(&mut Transaction) -> Result<()>,
    {
        let mut tx = Transaction::new(self.clone());
        f(&mut tx)?;
        let (mut doc, ops) = tx.into_parts();

        let Some(start_op) = ops.first().map(|op| op.id.counter) else {
            return Ok((self.clone(), None));
        };

        let seq = self.clock.get(&self.actor) + 1;
        let change = Change {
            actor: self.actor.clone(),
            seq,
            start_op,
            deps: self.clock.clone(),
            message,
            ops,
        };

        debug!(
            actor = %change.actor,
            seq,
            ops = change.ops.len(),
            "committed change"
        );

        doc.clock.update(&change.actor, seq);
        doc.history.push(change.clone());
        Ok((doc, Some(change)))
    }

    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    pub fn clock(&self) -> &VectorClock {
        &self.clock
    }

    /// Text currently under `key`
    pub fn text(&self, key: &str) -> Option<&Text> {
        self.root.get(key).and_then(|obj| self.objects.get(obj))
    }

    /// Root keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.root.keys().map(String::as_str)
    }

    /// Applied changes in application order
    pub fn history(&self) -> &[Change] {
        &self.history
    }

    /// Received changes still waiting on their dependencies
    pub fn pending_changes(&self) -> &[Change] {
        &self.queue
    }

    /// Changes in this document that `since` has not applied
    pub fn get_changes(&self, since: &Document) -> Vec<Change> {
        self.history
            .iter()
            .filter(|change| since.clock.get(&change.actor) < change.seq)
            .cloned()
            .collect()
    }

    /// Apply remote changes in causal order
    ///
    /// Changes already applied are skipped. Changes whose dependencies
    /// have not arrived yet are queued and applied once they can be.
    ///
    /// # Errors
    ///
    /// `TextError::UnknownReference` if a ready change references an
    /// object or element this document has never seen. `self` is left
    /// as it was.
    pub fn apply_changes<I>(&self, changes: I) -> Result<Document>
    where
        I: IntoIterator<Item = Change>,
    {
        let mut doc = self.clone();
        doc.queue.extend(changes);
        doc.drain_queue()?;
        Ok(doc)
    }

    /// Everything `other` has that this document lacks
    pub fn merge(&self, other: &Document) -> Result<Document> {
        let changes = other.get_changes(self);
        debug!(
            actor = %self.actor,
            from = %other.actor,
            changes = changes.len(),
            "merging document"
        );
        self.apply_changes(changes)
    }

    /// Serialize as a JSON object of key -> text string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn drain_queue(&mut self) -> Result<()> {
        loop {
            let mut progressed = false;

            for change in std::mem::take(&mut self.queue) {
                if self.clock.get(&change.actor) >= change.seq {
                    trace!(actor = %change.actor, seq = change.seq, "skipping duplicate change");
                } else if self.is_ready(&change) {
                    self.apply_change(change)?;
                    progressed = true;
                } else if self.is_queued(&change) {
                    trace!(actor = %change.actor, seq = change.seq, "change already queued");
                } else {
                    self.queue.push(change);
                }
            }

            if !progressed {
                break;
            }
        }

        if !self.queue.is_empty() {
            debug!(pending = self.queue.len(), "changes waiting on dependencies");
        }
        Ok(())
    }

    fn is_queued(&self, change: &Change) -> bool {
        self.queue
            .iter()
            .any(|queued| queued.actor == change.actor && queued.seq == change.seq)
    }

    fn is_ready(&self, change: &Change) -> bool {
        self.clock.get(&change.actor) + 1 == change.seq && self.clock.dominates(&change.deps)
    }

    fn apply_change(&mut self, change: Change) -> Result<()> {
        for op in &change.ops {
            self.apply_op(op)?;
        }

        trace!(actor = %change.actor, seq = change.seq, "applied change");
        self.clock.update(&change.actor, change.seq);
        self.history.push(change);
        Ok(())
    }

    fn apply_op(&mut self, op: &Op) -> Result<()> {
        match &op.action {
            OpAction::MakeText { key } => {
                self.objects
                    .entry(op.id.clone())
                    .or_insert_with(|| Text::attached(op.id.clone()));

                let wins = self.root.get(key).map_or(true, |current| op.id > *current);
                if wins {
                    self.root.insert(key.clone(), op.id.clone());
                }
            }
            OpAction::Insert { obj, pred, value } => {
                self.sequence_mut(obj)?
                    .insert_after(pred.as_ref(), op.id.clone(), value.clone())?;
            }
            OpAction::Delete { obj, elem } => {
                self.sequence_mut(obj)?.mark_deleted(elem)?;
            }
        }

        self.max_op.update(op.id.counter);
        Ok(())
    }

    fn sequence_mut(&mut self, obj: &ObjId) -> Result<&mut Sequence<Payload>> {
        self.objects
            .get_mut(obj)
            .and_then(Text::sequence_mut)
            .ok_or_else(|| TextError::UnknownReference(obj.clone()))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(
            self.root
                .iter()
                .filter_map(|(key, obj)| self.objects.get(obj).map(|text| (key, text))),
        )
    }
}
