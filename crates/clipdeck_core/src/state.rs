use std::collections::BTreeMap;

use crate::view_model::{UploadRowView, UploadViewModel};
use crate::{
    fallback_title, ItemId, ItemSeed, ItemSource, ProcessingBatch, ProcessingItem,
    SimulationSettings, Stage,
};

/// Details the upload page keeps alongside each item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ItemDetails {
    pub(crate) source: Option<ItemSource>,
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) duration_seconds: Option<u64>,
    /// A metadata lookup was requested and has not answered yet.
    pub(crate) metadata_pending: bool,
}

/// Foreground owner of a batch: the upload page's items and its ticker flag.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadState {
    batch: ProcessingBatch,
    details: BTreeMap<ItemId, ItemDetails>,
    next_id: ItemId,
    settings: SimulationSettings,
    ticker_running: bool,
    dirty: bool,
}

impl Default for UploadState {
    fn default() -> Self {
        Self::with_settings(SimulationSettings::foreground())
    }
}

impl UploadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: SimulationSettings) -> Self {
        Self {
            batch: ProcessingBatch::new(),
            details: BTreeMap::new(),
            next_id: 1,
            settings,
            ticker_running: false,
            dirty: false,
        }
    }

    pub fn view(&self) -> UploadViewModel {
        let items = self
            .batch
            .items()
            .iter()
            .map(|item| {
                let details = self.details.get(&item.id).cloned().unwrap_or_default();
                UploadRowView {
                    id: item.id,
                    display_name: item.display_name.clone(),
                    stage: item.stage,
                    local_progress: item.local_progress,
                    error_message: item.error_message.clone(),
                    source_url: match details.source {
                        Some(ItemSource::Url { url }) => Some(url),
                        _ => None,
                    },
                    thumbnail_url: details.thumbnail_url,
                    duration_seconds: details.duration_seconds,
                }
            })
            .collect();

        let is_processing = self.batch.active_count() > 0;
        // Idle items have not run yet, so a page holding any is not finished.
        let all_finished = !self.batch.is_empty() && self.batch.all_finished();

        UploadViewModel {
            items,
            aggregate_progress: self.batch.aggregate_progress(),
            is_processing,
            all_finished,
            can_start: self.has_idle_items(),
            dirty: self.dirty,
        }
    }

    /// Returns and clears the dirty flag used to throttle rendering.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn batch(&self) -> &ProcessingBatch {
        &self.batch
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker_running
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_ticker_running(&mut self, running: bool) {
        self.ticker_running = running;
    }

    pub(crate) fn has_idle_items(&self) -> bool {
        self.batch
            .items()
            .iter()
            .any(|item| item.stage == Stage::Idle)
    }

    pub(crate) fn add_item(&mut self, display_name: String, source: ItemSource) -> ItemId {
        let id = self.next_id;
        self.next_id += 1;
        self.batch.push(ProcessingItem::new(id, display_name));
        self.details.insert(
            id,
            ItemDetails {
                metadata_pending: matches!(source, ItemSource::Url { .. }),
                source: Some(source),
                ..ItemDetails::default()
            },
        );
        self.mark_dirty();
        id
    }

    pub(crate) fn remove_item(&mut self, id: ItemId) -> bool {
        let removed = self.batch.drain_where(|item| item.id == id);
        self.details.remove(&id);
        if removed.is_empty() {
            return false;
        }
        self.mark_dirty();
        true
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut ProcessingItem> {
        self.batch.get_mut(id)
    }

    pub(crate) fn details_mut(&mut self, id: ItemId) -> Option<&mut ItemDetails> {
        self.details.get_mut(&id)
    }

    /// Moves every idle item to the first active stage; returns how many moved.
    pub(crate) fn begin_idle_items(&mut self) -> usize {
        let idle: Vec<ItemId> = self
            .batch
            .items()
            .iter()
            .filter(|item| item.stage == Stage::Idle)
            .map(|item| item.id)
            .collect();
        for id in &idle {
            if let Some(item) = self.batch.get_mut(*id) {
                item.begin();
            }
        }
        if !idle.is_empty() {
            self.mark_dirty();
        }
        idle.len()
    }

    pub(crate) fn replace_batch(&mut self, batch: ProcessingBatch) {
        if batch != self.batch {
            self.mark_dirty();
        }
        self.batch = batch;
    }

    /// Releases all unfinished items, returning them as hand-off seeds.
    ///
    /// Links still waiting for metadata leave with their fallback title, since
    /// the answer will find nothing to update.
    pub(crate) fn release_unfinished(&mut self) -> Vec<ItemSeed> {
        let mut released = self.batch.drain_where(|item| !item.is_finished());
        for item in &mut released {
            let Some(details) = self.details.remove(&item.id) else {
                continue;
            };
            match details.source {
                Some(ItemSource::Url { url }) if details.metadata_pending => {
                    item.display_name = fallback_title(&url);
                }
                _ => {}
            }
        }
        if !released.is_empty() {
            self.mark_dirty();
        }
        released.iter().map(ItemSeed::from).collect()
    }
}
