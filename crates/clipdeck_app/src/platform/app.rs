use std::sync::Arc;

use clipdeck_core::{update, Effect, Msg, UploadState};
use clipdeck_engine::{
    BackgroundTracker, HttpMetadataFetcher, MetadataFetcher, StatusPollDriver,
};
use engine_logging::{engine_info, engine_warn};
use tokio::sync::mpsc;

use super::cli::CliOptions;
use super::config::{self, AppConfig};
use super::effects::{EffectRunner, LogProgressSink};
use super::error::AppError;
use super::{logging, render};

pub fn run_app() -> Result<(), AppError> {
    let options = CliOptions::parse(std::env::args().skip(1))?;
    let config = config::load(options.config_path.as_deref())?;
    logging::initialize(config.log_destination);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;
    runtime.block_on(run(options, config))
}

fn build_tracker(config: &AppConfig) -> Result<BackgroundTracker, AppError> {
    let tracker = match &config.status_endpoint {
        Some(endpoint) => {
            engine_info!("Background progress polled from {}", endpoint);
            let driver = StatusPollDriver::new(endpoint, &config.fetch_settings())?;
            BackgroundTracker::with_driver(config.background.tick_interval(), driver)?
        }
        None => BackgroundTracker::new(config.background)?,
    };
    Ok(tracker.with_sink(Arc::new(LogProgressSink)))
}

fn build_fetcher(config: &AppConfig) -> Result<Option<Arc<dyn MetadataFetcher>>, AppError> {
    let Some(endpoint) = &config.metadata_endpoint else {
        return Ok(None);
    };
    let fetcher: Arc<dyn MetadataFetcher> =
        Arc::new(HttpMetadataFetcher::new(endpoint, &config.fetch_settings())?);
    Ok(Some(fetcher))
}

/// The upload page: owns the state and routes effects.
struct UploadPage {
    state: UploadState,
    runner: EffectRunner,
    pending_lookups: usize,
}

impl UploadPage {
    fn dispatch(&mut self, msg: Msg) {
        if matches!(msg, Msg::MetadataResolved { .. }) {
            self.pending_lookups = self.pending_lookups.saturating_sub(1);
        }

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            for line in render::page_lines(&state.view()) {
                println!("{line}");
            }
        }
        self.state = state;

        self.pending_lookups += effects
            .iter()
            .filter(|effect| matches!(effect, Effect::FetchMetadata { .. }))
            .count();
        self.runner.enqueue(effects);
    }
}

async fn run(options: CliOptions, config: AppConfig) -> Result<(), AppError> {
    let tracker = Arc::new(build_tracker(&config)?);
    let fetcher = build_fetcher(&config)?;
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();

    let mut page = UploadPage {
        state: UploadState::with_settings(config.foreground),
        runner: EffectRunner::new(msg_tx, fetcher, tracker.clone()),
        pending_lookups: 0,
    };

    for source in options.sources {
        page.dispatch(Msg::ItemAdded(source));
    }

    let mut started = false;
    let mut page_ticks = 0u32;
    loop {
        if !started && page.pending_lookups == 0 {
            started = true;
            page.dispatch(Msg::StartClicked);
            if !page.state.ticker_running() {
                engine_warn!("Nothing to process");
                break;
            }
        }

        let Some(msg) = msg_rx.recv().await else {
            break;
        };
        let is_tick = matches!(msg, Msg::Tick { .. });
        page.dispatch(msg);

        if started && is_tick {
            page_ticks += 1;
            if !page.state.ticker_running() {
                engine_info!("Finished on the upload page after {} ticks", page_ticks);
                break;
            }
            if page_ticks >= config.background_after_ticks {
                page.dispatch(Msg::PutInBackgroundClicked);
                break;
            }
        }
    }

    if page.runner.handed_off() {
        follow_background(&tracker).await;
    }
    page.runner.shutdown();
    Ok(())
}

/// Shows the background indicator until every item is finished, then dismisses it.
async fn follow_background(tracker: &BackgroundTracker) {
    let mut views = tracker.subscribe();
    loop {
        let view = views.borrow_and_update().clone();
        for line in render::toast_lines(&view) {
            println!("{line}");
        }
        if !view.is_active || view.all_finished() {
            break;
        }
        if views.changed().await.is_err() {
            break;
        }
    }
    tracker.clear();
}
