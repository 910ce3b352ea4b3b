use serde::{Deserialize, Serialize};

use crate::{ActiveStage, Stage};

pub type ItemId = u64;

/// Upper bound for an item's progress within its current stage.
pub const STAGE_PROGRESS_MAX: f64 = 100.0;

/// Message for failures that arrive without one.
pub const UNKNOWN_FAILURE_MESSAGE: &str = "processing failed";

/// One video moving through the processing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingItem {
    pub id: ItemId,
    pub display_name: String,
    pub stage: Stage,
    /// Progress within `stage` only, in `[0, 100]`.
    pub local_progress: f64,
    /// Set only while `stage == Stage::Error`.
    pub error_message: Option<String>,
}

impl ProcessingItem {
    pub fn new(id: ItemId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            stage: Stage::Idle,
            local_progress: 0.0,
            error_message: None,
        }
    }

    /// Builds an item from the upload collaborator's tuple, clamping progress.
    pub fn from_seed(seed: ItemSeed) -> Self {
        let mut item = Self::new(seed.id, seed.display_name);
        item.stage = seed.initial_stage;
        item.local_progress = match seed.initial_stage {
            Stage::Complete => STAGE_PROGRESS_MAX,
            _ => clamp_progress(seed.initial_progress),
        };
        if item.stage == Stage::Error {
            item.error_message = Some(UNKNOWN_FAILURE_MESSAGE.to_string());
        }
        item
    }

    pub fn is_finished(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Puts the item at the first active stage with no progress.
    pub fn begin(&mut self) {
        self.stage = ActiveStage::FIRST.into();
        self.local_progress = 0.0;
        self.error_message = None;
    }

    /// Marks the item failed. Already-terminal items are left untouched.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.is_finished() {
            return;
        }
        self.stage = Stage::Error;
        self.error_message = Some(message.into());
    }

    pub fn complete(&mut self) {
        self.stage = Stage::Complete;
        self.local_progress = STAGE_PROGRESS_MAX;
        self.error_message = None;
    }
}

/// Input tuple handed over by the upload collaborator when a batch starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSeed {
    pub id: ItemId,
    pub display_name: String,
    pub initial_stage: Stage,
    pub initial_progress: f64,
}

impl ItemSeed {
    pub fn idle(id: ItemId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            initial_stage: Stage::Idle,
            initial_progress: 0.0,
        }
    }
}

impl From<&ProcessingItem> for ItemSeed {
    fn from(item: &ProcessingItem) -> Self {
        Self {
            id: item.id,
            display_name: item.display_name.clone(),
            initial_stage: item.stage,
            initial_progress: item.local_progress,
        }
    }
}

/// Clamps within-stage progress to `[0, 100]`; NaN becomes 0.
pub fn clamp_progress(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, STAGE_PROGRESS_MAX)
}
