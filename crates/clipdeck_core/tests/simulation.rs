use clipdeck_core::{
    advance_batch, aggregate_progress, prepare_seeds, ActiveStage, ConstantSampler, ItemSeed,
    OverflowPolicy, ProcessingBatch, ProcessingItem, SimulationSettings, Stage, StageTransition,
    UnitSampler,
};
use pretty_assertions::assert_eq;

fn item(id: u64, stage: Stage, local_progress: f64) -> ProcessingItem {
    ProcessingItem {
        stage,
        local_progress,
        ..ProcessingItem::new(id, format!("video-{id}.mp4"))
    }
}

fn batch(items: Vec<ProcessingItem>) -> ProcessingBatch {
    ProcessingBatch::from_items(items).expect("unique ids")
}

/// Increment is exactly `floor` when the sample is 0.
fn fixed_increment(step: f64, overflow: OverflowPolicy) -> SimulationSettings {
    SimulationSettings {
        tick_interval_ms: 1000,
        increment_scale: 0.0,
        increment_floor: step,
        overflow,
    }
}

struct SequenceSampler(Vec<f64>);

impl UnitSampler for SequenceSampler {
    fn sample(&mut self) -> f64 {
        if self.0.is_empty() {
            0.0
        } else {
            self.0.remove(0)
        }
    }
}

#[test]
fn overflow_with_reset_moves_to_next_stage_at_zero() {
    let start = batch(vec![item(1, Stage::Uploading, 95.0)]);
    let settings = fixed_increment(10.0, OverflowPolicy::Reset);

    let outcome = advance_batch(&start, &settings, &mut ConstantSampler(0.0));

    let moved = outcome.batch.get(1).unwrap();
    assert_eq!(moved.stage, Stage::Analyzing);
    assert_eq!(moved.local_progress, 0.0);
    assert_eq!(
        outcome.transitions,
        vec![StageTransition {
            id: 1,
            from: Stage::Uploading,
            to: Stage::Analyzing
        }]
    );
    assert!((aggregate_progress(outcome.batch.items()) - 12.5).abs() < 1e-9);
    assert!(!outcome.all_finished);
}

#[test]
fn overflow_with_carry_keeps_remainder() {
    let start = batch(vec![item(1, Stage::Uploading, 95.0)]);
    let settings = fixed_increment(10.0, OverflowPolicy::CarryRemainder);

    let outcome = advance_batch(&start, &settings, &mut ConstantSampler(0.0));

    let moved = outcome.batch.get(1).unwrap();
    assert_eq!(moved.stage, Stage::Analyzing);
    assert!((moved.local_progress - 5.0).abs() < 1e-9);
}

#[test]
fn last_stage_overflow_completes_at_full_progress() {
    let start = batch(vec![item(4, Stage::Optimizing, 99.0)]);
    let settings = fixed_increment(30.0, OverflowPolicy::CarryRemainder);

    let outcome = advance_batch(&start, &settings, &mut ConstantSampler(0.0));

    let done = outcome.batch.get(4).unwrap();
    assert_eq!(done.stage, Stage::Complete);
    assert_eq!(done.local_progress, 100.0);
    assert!(outcome.all_finished);
}

#[test]
fn terminal_and_idle_items_are_not_ticked() {
    let mut failed = item(2, Stage::Error, 40.0);
    failed.error_message = Some("transcoder crashed".into());
    let start = batch(vec![
        item(1, Stage::Complete, 100.0),
        failed.clone(),
        item(3, Stage::Idle, 0.0),
    ]);
    let settings = SimulationSettings::background();
    let mut rng = fastrand::Rng::with_seed(7);

    let outcome = advance_batch(&start, &settings, &mut rng);

    assert_eq!(outcome.batch, start);
    assert!(outcome.transitions.is_empty());
    // The idle item keeps the batch from counting as finished.
    assert!(!outcome.all_finished);
    assert_eq!(outcome.batch.get(2), Some(&failed));
}

#[test]
fn all_finished_is_reported_on_the_tick_that_finishes() {
    let mut failed = item(2, Stage::Error, 10.0);
    failed.error_message = Some("upload rejected".into());
    let start = batch(vec![item(1, Stage::Optimizing, 90.0), failed]);
    let settings = fixed_increment(15.0, OverflowPolicy::Reset);

    let outcome = advance_batch(&start, &settings, &mut ConstantSampler(0.0));

    assert!(outcome.all_finished);
    assert!((outcome.batch.aggregate_progress() - 50.0).abs() < 1e-9);
}

#[test]
fn output_order_matches_input_order() {
    let start = batch(vec![
        item(9, Stage::Merging, 10.0),
        item(3, Stage::Uploading, 0.0),
        item(5, Stage::Generating, 50.0),
    ]);
    let outcome = advance_batch(
        &start,
        &SimulationSettings::foreground(),
        &mut SequenceSampler(vec![0.5, 0.1, 0.9]),
    );
    let ids: Vec<_> = outcome.batch.items().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![9, 3, 5]);

    let progress: Vec<_> = outcome
        .batch
        .items()
        .iter()
        .map(|i| i.local_progress)
        .collect();
    assert!((progress[0] - 17.5).abs() < 1e-9);
    assert!((progress[1] - 1.5).abs() < 1e-9);
    assert!((progress[2] - 63.5).abs() < 1e-9);
}

#[test]
fn stages_never_regress_over_a_full_run() {
    let start = prepare_seeds(vec![
        ItemSeed::idle(1, "a.mp4"),
        ItemSeed::idle(2, "b.mp4"),
        ItemSeed {
            id: 3,
            display_name: "c.mp4".into(),
            initial_stage: Stage::Enhancing,
            initial_progress: 70.0,
        },
    ])
    .unwrap();
    let settings = SimulationSettings::background();
    let mut rng = fastrand::Rng::with_seed(42);

    let mut current = start;
    let mut finished_at = None;
    for tick in 0..200 {
        let outcome = advance_batch(&current, &settings, &mut rng);
        for (before, after) in current.items().iter().zip(outcome.batch.items()) {
            assert_eq!(before.id, after.id);
            assert!(
                before.stage.can_move_to(after.stage),
                "{} regressed from {} to {}",
                before.id,
                before.stage,
                after.stage
            );
            assert!((0.0..=100.0).contains(&after.local_progress));
            if before.is_finished() {
                assert_eq!(before, after);
            }
        }
        current = outcome.batch;
        if outcome.all_finished {
            finished_at = Some(tick);
            break;
        }
    }

    assert!(finished_at.is_some(), "batch never finished");
    assert!(current
        .items()
        .iter()
        .all(|item| item.stage == Stage::Complete && item.local_progress == 100.0));
    assert_eq!(current.aggregate_progress(), 100.0);
}

#[test]
fn every_active_stage_gets_equal_weight() {
    for stage in ActiveStage::SEQUENCE {
        let expected = stage.index() as f64 * 12.5;
        let got = aggregate_progress(&[item(1, stage.into(), 0.0)]);
        assert!((got - expected).abs() < 1e-9, "{stage:?}: {got}");
    }
}
