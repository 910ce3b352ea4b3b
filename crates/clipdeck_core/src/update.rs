use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::{advance_batch, fallback_title, Effect, ItemSource, Msg, UploadState};

const FETCHING_TITLE: &str = "Fetching metadata...";
const FETCH_FAILED_TITLE: &str = "Fetch Failed";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: UploadState, msg: Msg) -> (UploadState, Vec<Effect>) {
    let effects = match msg {
        Msg::ItemAdded(source) => match source {
            ItemSource::File { name } => {
                let name = if name.trim().is_empty() {
                    "Untitled Project".to_string()
                } else {
                    name
                };
                state.add_item(name.clone(), ItemSource::File { name });
                Vec::new()
            }
            ItemSource::Url { url } => {
                let url = url.trim().to_string();
                if url.is_empty() {
                    return (state, Vec::new());
                }
                let id = state.add_item(
                    FETCHING_TITLE.to_string(),
                    ItemSource::Url { url: url.clone() },
                );
                vec![Effect::FetchMetadata { id, url }]
            }
        },
        Msg::ItemRemoved { id } => {
            if !state.remove_item(id) {
                engine_debug!("ItemRemoved for unknown item {}", id);
            }
            Vec::new()
        }
        Msg::MetadataResolved { id, result } => {
            let url = match state.details_mut(id).and_then(|d| d.source.clone()) {
                Some(ItemSource::Url { url }) => url,
                _ => {
                    engine_debug!("Metadata for item {} ignored; no longer a URL item", id);
                    return (state, Vec::new());
                }
            };
            if let Some(details) = state.details_mut(id) {
                details.metadata_pending = false;
            }
            match result {
                Ok(metadata) => {
                    if let Some(details) = state.details_mut(id) {
                        details.thumbnail_url = metadata.thumbnail_url;
                        details.duration_seconds = metadata.duration_seconds;
                    }
                    if let Some(item) = state.item_mut(id) {
                        item.display_name = metadata
                            .title
                            .filter(|title| !title.trim().is_empty())
                            .unwrap_or_else(|| fallback_title(&url));
                    }
                }
                Err(message) => {
                    engine_warn!("Metadata fetch failed for item {}: {}", id, message);
                    if let Some(item) = state.item_mut(id) {
                        item.display_name = FETCH_FAILED_TITLE.to_string();
                        item.fail(message);
                    }
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::StartClicked => {
            let started = state.begin_idle_items();
            if started == 0 {
                return (state, Vec::new());
            }
            engine_info!("Starting processing for {} items", started);
            if state.ticker_running() {
                // The running ticker already advances every active item.
                Vec::new()
            } else {
                state.set_ticker_running(true);
                vec![Effect::StartTicker {
                    interval: state.settings().tick_interval(),
                }]
            }
        }
        Msg::Tick { seed } => {
            if !state.ticker_running() {
                return (state, Vec::new());
            }
            let mut rng = fastrand::Rng::with_seed(seed);
            let settings = *state.settings();
            let outcome = advance_batch(state.batch(), &settings, &mut rng);
            for transition in &outcome.transitions {
                engine_debug!(
                    "Item {} moved {} -> {}",
                    transition.id,
                    transition.from,
                    transition.to
                );
            }
            state.replace_batch(outcome.batch);

            if state.batch().active_count() == 0 {
                engine_info!("No active items left; stopping page ticker");
                state.set_ticker_running(false);
                vec![Effect::StopTicker]
            } else {
                Vec::new()
            }
        }
        Msg::PutInBackgroundClicked => {
            let seeds = state.release_unfinished();
            if seeds.is_empty() {
                engine_info!("Nothing to hand off; all items are complete or failed");
                return (state, Vec::new());
            }
            engine_info!("Handing {} items to background processing", seeds.len());
            let mut effects = Vec::with_capacity(2);
            if state.ticker_running() {
                state.set_ticker_running(false);
                effects.push(Effect::StopTicker);
            }
            effects.push(Effect::HandOff { seeds });
            effects
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
