use std::sync::Arc;
use std::time::Duration;

use clipdeck_core::{Effect, ItemId, Msg, VideoMetadata};
use clipdeck_engine::{BackgroundTracker, MetadataFetcher, ProgressSink, TrackerEvent};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Executes effects emitted by `update` and feeds results back as messages.
pub struct EffectRunner {
    msg_tx: UnboundedSender<Msg>,
    fetcher: Option<Arc<dyn MetadataFetcher>>,
    tracker: Arc<BackgroundTracker>,
    page_ticker: Option<JoinHandle<()>>,
    handed_off: bool,
}

impl EffectRunner {
    pub fn new(
        msg_tx: UnboundedSender<Msg>,
        fetcher: Option<Arc<dyn MetadataFetcher>>,
        tracker: Arc<BackgroundTracker>,
    ) -> Self {
        Self {
            msg_tx,
            fetcher,
            tracker,
            page_ticker: None,
            handed_off: false,
        }
    }

    pub fn handed_off(&self) -> bool {
        self.handed_off
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchMetadata { id, url } => self.fetch_metadata(id, url),
                Effect::StartTicker { interval } => self.start_page_ticker(interval),
                Effect::StopTicker => self.stop_page_ticker(),
                Effect::HandOff { seeds } => {
                    let count = seeds.len();
                    match self.tracker.start(seeds) {
                        Ok(()) => {
                            engine_info!("Handed {} items to background processing", count);
                            self.handed_off = true;
                        }
                        Err(err) => engine_error!("Background hand-off failed: {}", err),
                    }
                }
            }
        }
    }

    fn fetch_metadata(&self, id: ItemId, url: String) {
        let Some(fetcher) = self.fetcher.clone() else {
            engine_debug!("No metadata endpoint; item {} keeps a fallback title", id);
            let _ = self.msg_tx.send(Msg::MetadataResolved {
                id,
                result: Ok(VideoMetadata::default()),
            });
            return;
        };

        let msg_tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&url).await.map_err(|err| {
                engine_warn!("Metadata lookup for item {} failed: {}", id, err);
                err.message
            });
            let _ = msg_tx.send(Msg::MetadataResolved { id, result });
        });
    }

    fn start_page_ticker(&mut self, interval: Duration) {
        self.stop_page_ticker();
        let msg_tx = self.msg_tx.clone();
        self.page_ticker = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + interval, interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let seed = fastrand::u64(..);
                if msg_tx.send(Msg::Tick { seed }).is_err() {
                    break;
                }
            }
        }));
        engine_debug!("Page ticker started every {:?}", interval);
    }

    fn stop_page_ticker(&mut self) {
        if let Some(task) = self.page_ticker.take() {
            task.abort();
            engine_debug!("Page ticker stopped");
        }
    }

    pub fn shutdown(&mut self) {
        self.stop_page_ticker();
        self.tracker.shutdown();
    }
}

impl Drop for EffectRunner {
    fn drop(&mut self) {
        self.stop_page_ticker();
    }
}

/// Mirrors background tracker events into the log.
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: TrackerEvent) {
        match event {
            TrackerEvent::Started { items } => {
                engine_info!("Background: started {} items", items)
            }
            TrackerEvent::StageChanged(transition) => engine_debug!(
                "Background: item {} {} -> {}",
                transition.id,
                transition.from,
                transition.to
            ),
            TrackerEvent::ItemFailed { id, message } => {
                engine_warn!("Background: item {} failed: {}", id, message)
            }
            TrackerEvent::Finished { aggregate_progress } => {
                engine_info!("Background: finished at {:.1}%", aggregate_progress)
            }
            TrackerEvent::Cleared => engine_info!("Background: dismissed"),
        }
    }
}
