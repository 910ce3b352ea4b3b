//! Clipdeck engine: background tracking, progress drivers and HTTP collaborators.
mod driver;
mod http;
mod metadata;
mod poll;
mod sink;
mod tracker;
mod types;

pub use driver::{ProgressDriver, SimulatedDriver};
pub use http::FetchSettings;
pub use metadata::{HttpMetadataFetcher, MetadataFetcher};
pub use poll::{apply_status, StatusPollDriver, StatusReply};
pub use sink::{ChannelProgressSink, ProgressSink};
pub use tracker::{BackgroundTracker, TrackerView};
pub use types::{FailureKind, FetchError, TrackerError, TrackerEvent};
