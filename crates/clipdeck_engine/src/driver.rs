use clipdeck_core::{advance_batch, ProcessingBatch, SimulationSettings, TickOutcome};

/// Produces the next batch snapshot on every tick of a tracker.
#[async_trait::async_trait]
pub trait ProgressDriver: Send {
    async fn advance(&mut self, batch: &ProcessingBatch) -> TickOutcome;
}

/// Random-increment driver standing in for a real processing service.
#[derive(Debug)]
pub struct SimulatedDriver {
    settings: SimulationSettings,
    rng: fastrand::Rng,
}

impl SimulatedDriver {
    pub fn new(settings: SimulationSettings) -> Self {
        Self {
            settings,
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(settings: SimulationSettings, seed: u64) -> Self {
        Self {
            settings,
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

#[async_trait::async_trait]
impl ProgressDriver for SimulatedDriver {
    async fn advance(&mut self, batch: &ProcessingBatch) -> TickOutcome {
        advance_batch(batch, &self.settings, &mut self.rng)
    }
}
