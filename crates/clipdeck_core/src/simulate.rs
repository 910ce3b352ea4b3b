use crate::{
    clamp_progress, next_stage, ItemId, OverflowPolicy, ProcessingBatch, ProcessingItem,
    SimulationSettings, Stage, STAGE_PROGRESS_MAX,
};

/// Source of uniform samples in `[0, 1)` for progress increments.
pub trait UnitSampler {
    fn sample(&mut self) -> f64;
}

impl UnitSampler for fastrand::Rng {
    fn sample(&mut self) -> f64 {
        self.f64()
    }
}

/// Always yields the same sample; handy for deterministic runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSampler(pub f64);

impl UnitSampler for ConstantSampler {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    pub id: ItemId,
    pub from: Stage,
    pub to: Stage,
}

/// Result of advancing a batch by one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub batch: ProcessingBatch,
    pub transitions: Vec<StageTransition>,
    /// Computed on `batch`, i.e. the state after this tick.
    pub all_finished: bool,
}

impl TickOutcome {
    pub fn new(batch: ProcessingBatch, transitions: Vec<StageTransition>) -> Self {
        let all_finished = batch.all_finished();
        Self {
            batch,
            transitions,
            all_finished,
        }
    }
}

/// Advances one item by `increment`, delegating stage changes to the sequencer.
///
/// Items that are idle or terminal come back unchanged.
pub fn advance_item(
    item: &ProcessingItem,
    increment: f64,
    overflow: OverflowPolicy,
) -> (ProcessingItem, Option<StageTransition>) {
    let Some(active) = item.stage.as_active() else {
        return (item.clone(), None);
    };

    let raw = item.local_progress + increment.max(0.0);
    let overflowed = raw >= STAGE_PROGRESS_MAX;
    let stage = next_stage(active, overflowed);

    let local_progress = if !overflowed {
        clamp_progress(raw)
    } else if stage == Stage::Complete {
        STAGE_PROGRESS_MAX
    } else {
        match overflow {
            OverflowPolicy::CarryRemainder => clamp_progress(raw - STAGE_PROGRESS_MAX),
            OverflowPolicy::Reset => 0.0,
        }
    };

    let transition = (stage != item.stage).then_some(StageTransition {
        id: item.id,
        from: item.stage,
        to: stage,
    });

    let next = ProcessingItem {
        stage,
        local_progress,
        ..item.clone()
    };
    (next, transition)
}

/// Advances every active item in `batch` by one random increment.
///
/// Each item reads only the previous snapshot, so iteration order has no
/// effect beyond preserving output order.
pub fn advance_batch(
    batch: &ProcessingBatch,
    settings: &SimulationSettings,
    sampler: &mut impl UnitSampler,
) -> TickOutcome {
    let mut transitions = Vec::new();
    let next = batch.map_items(|item| {
        if !item.stage.is_active() {
            return item.clone();
        }
        let increment = sampler.sample() * settings.increment_scale + settings.increment_floor;
        let (next, transition) = advance_item(item, increment, settings.overflow);
        transitions.extend(transition);
        next
    });
    TickOutcome::new(next, transitions)
}
