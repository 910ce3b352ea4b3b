use std::fmt;

use clipdeck_core::{BatchError, ConfigError, ItemId, StageTransition};
use thiserror::Error;

/// Notifications emitted by the background tracker as its batch evolves.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    Started { items: usize },
    StageChanged(StageTransition),
    ItemFailed { id: ItemId, message: String },
    /// Every item is complete or failed; the ticker has stopped.
    Finished { aggregate_progress: f64 },
    Cleared,
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("background tracker must be created inside a tokio runtime")]
    NoRuntime,
    #[error("invalid simulation settings: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid batch: {0}")]
    Batch(#[from] BatchError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// The body could not be decoded into the expected reply.
    InvalidResponse,
    /// The service answered but reported a failure.
    Rejected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::Rejected => write!(f, "rejected"),
        }
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::InvalidResponse, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
