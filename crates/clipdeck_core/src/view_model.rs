use crate::{ItemId, Stage};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadViewModel {
    pub items: Vec<UploadRowView>,
    pub aggregate_progress: f64,
    /// At least one item is in an active stage.
    pub is_processing: bool,
    pub all_finished: bool,
    pub can_start: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRowView {
    pub id: ItemId,
    pub display_name: String,
    pub stage: Stage,
    pub local_progress: f64,
    pub error_message: Option<String>,
    pub source_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<u64>,
}
