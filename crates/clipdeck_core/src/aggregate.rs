use crate::{ActiveStage, ProcessingItem, Stage, STAGE_PROGRESS_MAX};

/// Overall completion of a single item, in `[0, 100]`.
///
/// Every active stage carries the same weight. Failed items earn no credit.
pub fn item_progress(item: &ProcessingItem) -> f64 {
    match item.stage {
        Stage::Complete => STAGE_PROGRESS_MAX,
        Stage::Error | Stage::Idle => 0.0,
        stage => {
            let Some(active) = stage.as_active() else {
                return 0.0;
            };
            let stages = ActiveStage::COUNT as f64;
            let per_stage = STAGE_PROGRESS_MAX / stages;
            let completed = active.index() as f64 / stages * STAGE_PROGRESS_MAX;
            let within = item.local_progress / STAGE_PROGRESS_MAX * per_stage;
            (completed + within).min(STAGE_PROGRESS_MAX)
        }
    }
}

/// Mean of [`item_progress`] across `items`; `0` for an empty batch.
pub fn aggregate_progress(items: &[ProcessingItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let total: f64 = items.iter().map(item_progress).sum();
    total / items.len() as f64
}
