use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, STAGE_PROGRESS_MAX};

/// What happens to progress beyond 100 when a stage completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// The excess becomes the next stage's starting progress.
    #[default]
    CarryRemainder,
    /// The next stage always starts at 0.
    Reset,
}

/// Tunables for the random-increment simulator.
///
/// Each tick adds `sample * increment_scale + increment_floor` to an active
/// item, where `sample` is uniform in `[0, 1)`. Deserializing needs every
/// field; owners fill gaps from their own preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub tick_interval_ms: u64,
    pub increment_scale: f64,
    pub increment_floor: f64,
    pub overflow: OverflowPolicy,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self::background()
    }
}

impl SimulationSettings {
    /// Cadence used once processing has been moved to the background.
    pub fn background() -> Self {
        Self {
            tick_interval_ms: 1500,
            increment_scale: 20.0,
            increment_floor: 15.0,
            overflow: OverflowPolicy::CarryRemainder,
        }
    }

    /// Cadence used while the upload page owns the batch.
    pub fn foreground() -> Self {
        Self {
            tick_interval_ms: 1000,
            increment_scale: 15.0,
            increment_floor: 0.0,
            overflow: OverflowPolicy::CarryRemainder,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        check_constant("increment_scale", self.increment_scale)?;
        check_constant("increment_floor", self.increment_floor)?;
        if self.increment_scale + self.increment_floor > STAGE_PROGRESS_MAX {
            return Err(ConfigError::IncrementTooLarge {
                scale: self.increment_scale,
                floor: self.increment_floor,
            });
        }
        Ok(())
    }
}

fn check_constant(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidConstant { name, value })
    }
}
