use thiserror::Error;

use crate::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("item id {0} appears more than once in the batch")]
    DuplicateId(ItemId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
    #[error("{name} must be a finite, non-negative number (got {value})")]
    InvalidConstant { name: &'static str, value: f64 },
    #[error("increment range exceeds one stage: scale {scale} + floor {floor} > 100")]
    IncrementTooLarge { scale: f64, floor: f64 },
}
