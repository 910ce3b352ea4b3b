use crate::{ItemId, VideoMetadata};

/// Where a newly added video comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSource {
    File { name: String },
    Url { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User added a video to the upload list.
    ItemAdded(ItemSource),
    /// User removed a video from the upload list.
    ItemRemoved { id: ItemId },
    /// Metadata lookup for a URL-sourced item finished.
    MetadataResolved {
        id: ItemId,
        result: Result<VideoMetadata, String>,
    },
    /// User clicked "Process Video".
    StartClicked,
    /// Page ticker fired. `seed` drives this tick's random increments.
    Tick { seed: u64 },
    /// User asked to keep processing while navigating away.
    PutInBackgroundClicked,
    /// Fallback for placeholder wiring.
    NoOp,
}
