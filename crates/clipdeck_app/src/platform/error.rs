use std::path::PathBuf;

use clipdeck_core::ConfigError;
use clipdeck_engine::{FetchError, TrackerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error("failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid {section} settings: {source}")]
    Settings {
        section: &'static str,
        #[source]
        source: ConfigError,
    },
    #[error("failed to build http client: {0}")]
    Http(#[from] FetchError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
