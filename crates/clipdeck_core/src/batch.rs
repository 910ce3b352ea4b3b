use std::collections::HashSet;

use serde::Serialize;

use crate::{aggregate_progress, BatchError, ItemId, ProcessingItem};

/// Ordered set of items owned by one simulator at a time.
///
/// A batch is never edited in place by its owner's tick; each tick builds a
/// replacement so readers always see a consistent snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProcessingBatch {
    items: Vec<ProcessingItem>,
}

impl ProcessingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a batch, preserving order and rejecting repeated ids.
    pub fn from_items(items: Vec<ProcessingItem>) -> Result<Self, BatchError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(BatchError::DuplicateId(item.id));
            }
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[ProcessingItem] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&ProcessingItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when no item is left to tick. An empty batch is finished.
    pub fn all_finished(&self) -> bool {
        self.items.iter().all(ProcessingItem::is_finished)
    }

    pub fn active_count(&self) -> usize {
        self.items.iter().filter(|item| item.stage.is_active()).count()
    }

    pub fn aggregate_progress(&self) -> f64 {
        aggregate_progress(&self.items)
    }

    /// Callers allocate ids, so uniqueness is theirs to keep.
    pub(crate) fn push(&mut self, item: ProcessingItem) {
        debug_assert!(self.get(item.id).is_none());
        self.items.push(item);
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut ProcessingItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Removes and returns the items matching `predicate`, keeping order.
    pub(crate) fn drain_where(
        &mut self,
        mut predicate: impl FnMut(&ProcessingItem) -> bool,
    ) -> Vec<ProcessingItem> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| predicate(item));
        self.items = kept;
        taken
    }

    /// Items are mapped one-to-one, so ids stay unique.
    pub(crate) fn map_items(&self, f: impl FnMut(&ProcessingItem) -> ProcessingItem) -> Self {
        Self {
            items: self.items.iter().map(f).collect(),
        }
    }
}
