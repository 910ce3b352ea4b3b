use crate::{BatchError, ItemSeed, ProcessingBatch, ProcessingItem, Stage};

/// Readies items for a new owner: idle items start at the first active stage.
///
/// Items already past `Idle` keep their stage and progress.
pub fn prepare_for_background(
    items: impl IntoIterator<Item = ProcessingItem>,
) -> Result<ProcessingBatch, BatchError> {
    let prepared = items
        .into_iter()
        .map(|mut item| {
            if item.stage == Stage::Idle {
                item.begin();
            }
            item
        })
        .collect();
    ProcessingBatch::from_items(prepared)
}

/// Same as [`prepare_for_background`] for the upload collaborator's tuples.
pub fn prepare_seeds(
    seeds: impl IntoIterator<Item = ItemSeed>,
) -> Result<ProcessingBatch, BatchError> {
    prepare_for_background(seeds.into_iter().map(ProcessingItem::from_seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_seeds_start_uploading_from_zero() {
        let batch = prepare_seeds(vec![
            ItemSeed::idle(1, "a.mp4"),
            ItemSeed {
                id: 2,
                display_name: "b.mp4".into(),
                initial_stage: Stage::Merging,
                initial_progress: 40.0,
            },
        ])
        .unwrap();

        let first = batch.get(1).unwrap();
        assert_eq!(first.stage, Stage::Uploading);
        assert_eq!(first.local_progress, 0.0);
        let second = batch.get(2).unwrap();
        assert_eq!(second.stage, Stage::Merging);
        assert_eq!(second.local_progress, 40.0);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = prepare_seeds(vec![ItemSeed::idle(3, "a"), ItemSeed::idle(3, "b")]).unwrap_err();
        assert_eq!(err, BatchError::DuplicateId(3));
    }
}
