//! Sequence: Replicated Growable Array of elements
//!
//! The sequence keeps every element ever inserted in an arena keyed by
//! [`OpId`], plus a cached document-order list of ids (tombstones
//! included). Each element remembers the predecessor it was inserted
//! after; the document order is the pre-order walk of that insert-after
//! tree with siblings visited in descending id order.
//!
//! # Integration
//!
//! A new element is placed directly after its predecessor, then moved
//! right past every following element whose id is greater than its own.
//! Every element's counter is larger than its predecessor's counter, so
//! the skipped elements are exactly the subtrees of newer siblings. This
//! gives two properties every replica relies on:
//!
//! - **Convergence**: the order depends only on the set of elements, not
//!   on the order they were integrated in.
//! - **No interleaving**: a run typed left to right is a chain in the
//!   tree, so two runs inserted concurrently at the same position end up
//!   one after the other, never mixed.
//!
//! # Example
//!
//! ```rust
//! use synckit_richtext::{OpId, Sequence};
//!
//! let mut seq = Sequence::new();
//! let a = OpId::new(1, "alice".to_string());
//! let b = OpId::new(2, "alice".to_string());
//!
//! seq.insert_after(None, a.clone(), 'a').unwrap();
//! seq.insert_after(Some(&a), b.clone(), 'b').unwrap();
//! seq.mark_deleted(&a).unwrap();
//!
//! let visible: Vec<char> = seq.visible().map(|(_, ch)| *ch).collect();
//! assert_eq!(visible, vec!['b']);
//! ```

use super::element::Element;
use super::id::OpId;
use crate::error::{Result, TextError};
use std::collections::HashMap;

/// Replicated sequence of `T` values with tombstone deletion
#[derive(Debug, Clone)]
pub struct Sequence<T> {
    /// Arena of every element, live or deleted
    elements: HashMap<OpId, Element<T>>,

    /// Document order of all element ids (tombstones included)
    order: Vec<OpId>,

    /// Number of non-deleted elements
    visible_len: usize,

    /// Position of the most recent insert. Sequential typing inserts
    /// after the element it just created, so checking here first avoids
    /// rescanning `order`.
    last_insert: Option<usize>,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self {
            elements: HashMap::new(),
            order: Vec::new(),
            visible_len: 0,
            last_insert: None,
        }
    }
}

impl<T: Clone> Sequence<T> {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visible elements
    pub fn len(&self) -> usize {
        self.visible_len
    }

    pub fn is_empty(&self) -> bool {
        self.visible_len == 0
    }

    /// Number of deleted elements still held for merge purposes
    pub fn tombstone_count(&self) -> usize {
        self.order.len() - self.visible_len
    }

    /// Check whether an element (live or deleted) is known
    pub fn contains(&self, id: &OpId) -> bool {
        self.elements.contains_key(id)
    }

    /// Look up an element (live or deleted) by id
    pub fn element(&self, id: &OpId) -> Option<&Element<T>> {
        self.elements.get(id)
    }

    /// Largest counter of any integrated element
    pub fn max_counter(&self) -> u64 {
        self.elements.keys().map(|id| id.counter).max().unwrap_or(0)
    }

    /// Insert `value` with id `id` directly after `pred` (None = head)
    ///
    /// Inserting an id that is already present is a no-op, which makes
    /// redelivery of the same operation harmless.
    ///
    /// # Errors
    ///
    /// Returns `TextError::UnknownReference` if `pred` was never
    /// integrated. The sequence is left untouched.
    pub fn insert_after(&mut self, pred: Option<&OpId>, id: OpId, value: T) -> Result<()> {
        if self.elements.contains_key(&id) {
            return Ok(());
        }

        let mut pos = match pred {
            None => 0,
            Some(pred_id) => {
                self.position_of(pred_id)
                    .ok_or_else(|| TextError::UnknownReference(pred_id.clone()))?
                    + 1
            }
        };

        // Skip newer concurrent siblings and their subtrees
        while pos < self.order.len() && self.order[pos] > id {
            pos += 1;
        }

        self.order.insert(pos, id.clone());
        self.elements
            .insert(id.clone(), Element::new(id, pred.cloned(), value));
        self.visible_len += 1;
        self.last_insert = Some(pos);

        Ok(())
    }

    /// Tombstone the element with the given id
    ///
    /// Returns `true` if the element was live, `false` if it was already
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns `TextError::UnknownReference` if the id was never
    /// integrated.
    pub fn mark_deleted(&mut self, id: &OpId) -> Result<bool> {
        let element = self
            .elements
            .get_mut(id)
            .ok_or_else(|| TextError::UnknownReference(id.clone()))?;

        let newly_deleted = element.delete();
        if newly_deleted {
            self.visible_len -= 1;
        }
        Ok(newly_deleted)
    }

    /// Visible elements in document order
    pub fn visible(&self) -> Visible<'_, T> {
        Visible {
            order: self.order.iter(),
            elements: &self.elements,
        }
    }

    /// Every element, deleted or not, in document order
    pub fn iter_all(&self) -> impl Iterator<Item = &Element<T>> + '_ {
        self.order.iter().filter_map(move |id| self.elements.get(id))
    }

    /// Value of the visible element at `index`
    pub fn get(&self, index: usize) -> Option<&T> {
        self.visible().nth(index).map(|(_, value)| value)
    }

    /// Id of the visible element at `index`
    pub fn id_at(&self, index: usize) -> Option<&OpId> {
        self.visible().nth(index).map(|(id, _)| id)
    }

    /// Ids of `count` visible elements starting at `index`
    ///
    /// # Errors
    ///
    /// Returns `TextError::IndexOutOfRange` if the range runs past the end.
    pub fn ids_in_range(&self, index: usize, count: usize) -> Result<Vec<OpId>> {
        let end = index.checked_add(count).unwrap_or(usize::MAX);
        if end > self.visible_len {
            return Err(TextError::IndexOutOfRange {
                index: end,
                length: self.visible_len,
            });
        }

        Ok(self
            .visible()
            .skip(index)
            .take(count)
            .map(|(id, _)| id.clone())
            .collect())
    }

    /// Merge another replica's sequence into this one
    ///
    /// Elements are integrated in the other replica's document order, which
    /// always lists a predecessor before anything inserted after it.
    /// Deletions are unioned afterwards. The result is independent of
    /// which side merges into which.
    pub fn merge(&mut self, other: &Sequence<T>) -> Result<()> {
        for element in other.iter_all() {
            if !self.contains(&element.id) {
                self.insert_after(
                    element.pred.as_ref(),
                    element.id.clone(),
                    element.value.clone(),
                )?;
            }
        }

        for element in other.iter_all().filter(|e| e.deleted) {
            self.mark_deleted(&element.id)?;
        }

        Ok(())
    }

    fn position_of(&self, id: &OpId) -> Option<usize> {
        if let Some(hint) = self.last_insert {
            if self.order.get(hint) == Some(id) {
                return Some(hint);
            }
        }
        self.order.iter().position(|candidate| candidate == id)
    }
}

/// Iterator over visible `(id, value)` pairs in document order
pub struct Visible<'a, T> {
    order: std::slice::Iter<'a, OpId>,
    elements: &'a HashMap<OpId, Element<T>>,
}

impl<T> Clone for Visible<'_, T> {
    fn clone(&self) -> Self {
        Self {
            order: self.order.clone(),
            elements: self.elements,
        }
    }
}

impl<'a, T> Iterator for Visible<'a, T> {
    type Item = (&'a OpId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        for id in self.order.by_ref() {
            if let Some(element) = self.elements.get(id) {
                if element.is_visible() {
                    return Some((&element.id, &element.value));
                }
            }
        }
        None
    }
}
