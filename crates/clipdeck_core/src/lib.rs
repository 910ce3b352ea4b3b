//! Clipdeck core: processing stages, progress simulation and the upload page state machine.
mod aggregate;
mod batch;
mod effect;
mod error;
mod handoff;
mod item;
mod metadata;
mod msg;
mod sequencer;
mod settings;
mod simulate;
mod stage;
mod state;
mod update;
mod view_model;

pub use aggregate::{aggregate_progress, item_progress};
pub use batch::ProcessingBatch;
pub use effect::Effect;
pub use error::{BatchError, ConfigError};
pub use handoff::{prepare_for_background, prepare_seeds};
pub use item::{
    clamp_progress, ItemId, ItemSeed, ProcessingItem, STAGE_PROGRESS_MAX, UNKNOWN_FAILURE_MESSAGE,
};
pub use metadata::{fallback_title, MetadataReply, VideoMetadata};
pub use msg::{ItemSource, Msg};
pub use sequencer::next_stage;
pub use settings::{OverflowPolicy, SimulationSettings};
pub use simulate::{
    advance_batch, advance_item, ConstantSampler, StageTransition, TickOutcome, UnitSampler,
};
pub use stage::{ActiveStage, Stage};
pub use state::UploadState;
pub use update::update;
pub use view_model::{UploadRowView, UploadViewModel};
