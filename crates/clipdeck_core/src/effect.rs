use std::time::Duration;

use crate::{ItemId, ItemSeed};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Resolve title and details for a URL-sourced item.
    FetchMetadata { id: ItemId, url: String },
    /// Start the page's repeating tick; never issued while one is running.
    StartTicker { interval: Duration },
    StopTicker,
    /// Move these items to the background tracker. The page has released them.
    HandOff { seeds: Vec<ItemSeed> },
}
