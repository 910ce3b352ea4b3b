//! Process-wide background processing state.
//!
//! The tracker owns a batch handed over from the upload page and keeps
//! advancing it on a timer after the page is gone. Observers read
//! snapshots through [`BackgroundTracker::view`] or a watch channel; only
//! the tracker itself replaces the batch.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use clipdeck_core::{
    prepare_seeds, ItemSeed, ProcessingBatch, ProcessingItem, SimulationSettings, Stage,
    TickOutcome,
};
use engine_logging::{engine_debug, engine_info};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{ProgressDriver, ProgressSink, SimulatedDriver, TrackerError, TrackerEvent};

/// Read-only snapshot published to observers after every change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerView {
    pub is_active: bool,
    pub items: Vec<ProcessingItem>,
    pub aggregate_progress: f64,
}

impl TrackerView {
    pub fn completed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.stage == Stage::Complete)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.stage == Stage::Error)
            .count()
    }

    pub fn all_finished(&self) -> bool {
        self.items.iter().all(ProcessingItem::is_finished)
    }
}

type SharedDriver = Arc<tokio::sync::Mutex<Box<dyn ProgressDriver>>>;

struct TickerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl TickerHandle {
    fn cancel(self) {
        self.token.cancel();
        self.task.abort();
    }
}

struct Shared {
    batch: ProcessingBatch,
    is_active: bool,
    /// Bumped on every start/clear so a superseded ticker cannot write.
    generation: u64,
    ticker: Option<TickerHandle>,
}

impl Shared {
    fn view(&self) -> TrackerView {
        TrackerView {
            is_active: self.is_active,
            items: self.batch.items().to_vec(),
            aggregate_progress: self.batch.aggregate_progress(),
        }
    }

    fn stop_ticker(&mut self) -> bool {
        match self.ticker.take() {
            Some(ticker) => {
                ticker.cancel();
                true
            }
            None => false,
        }
    }
}

/// Everything a ticker task needs, cloned out of the tracker.
#[derive(Clone)]
struct Context {
    shared: Arc<Mutex<Shared>>,
    driver: SharedDriver,
    view_tx: Arc<watch::Sender<Arc<TrackerView>>>,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl Context {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, shared: &Shared) {
        self.view_tx.send_replace(Arc::new(shared.view()));
    }

    fn emit(&self, event: TrackerEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(event);
        }
    }
}

/// Owner of the background batch and its single ticker.
///
/// Create one per application and pass it to whatever needs to observe or
/// start background work. Dropping it cancels the ticker.
pub struct BackgroundTracker {
    ctx: Context,
    runtime: Handle,
    interval: Duration,
}

impl BackgroundTracker {
    /// Tracker driven by the random-increment simulator.
    pub fn new(settings: SimulationSettings) -> Result<Self, TrackerError> {
        settings.validate()?;
        Self::with_driver(settings.tick_interval(), SimulatedDriver::new(settings))
    }

    /// Tracker driven by any [`ProgressDriver`], ticking every `interval`.
    pub fn with_driver(
        interval: Duration,
        driver: impl ProgressDriver + 'static,
    ) -> Result<Self, TrackerError> {
        if interval.is_zero() {
            return Err(clipdeck_core::ConfigError::ZeroTickInterval.into());
        }
        let runtime = Handle::try_current().map_err(|_| TrackerError::NoRuntime)?;
        let shared = Shared {
            batch: ProcessingBatch::new(),
            is_active: false,
            generation: 0,
            ticker: None,
        };
        let (view_tx, _) = watch::channel(Arc::new(shared.view()));
        let driver: Box<dyn ProgressDriver> = Box::new(driver);
        Ok(Self {
            ctx: Context {
                shared: Arc::new(Mutex::new(shared)),
                driver: Arc::new(tokio::sync::Mutex::new(driver)),
                view_tx: Arc::new(view_tx),
                sink: None,
            },
            runtime,
            interval,
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.ctx.sink = Some(sink);
        self
    }

    pub fn view(&self) -> Arc<TrackerView> {
        self.ctx.view_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<TrackerView>> {
        self.ctx.view_tx.subscribe()
    }

    pub fn is_ticking(&self) -> bool {
        self.ctx.lock().ticker.is_some()
    }

    /// Takes ownership of `seeds` and starts advancing them.
    ///
    /// Idle items begin at the first active stage. Any previous batch and its
    /// ticker are replaced; at most one ticker runs at a time.
    pub fn start(&self, seeds: Vec<ItemSeed>) -> Result<(), TrackerError> {
        let batch = prepare_seeds(seeds)?;
        let count = batch.len();

        let mut shared = self.ctx.lock();
        if shared.stop_ticker() {
            engine_debug!("Cancelled previous background ticker");
        }
        shared.generation += 1;
        shared.is_active = !batch.is_empty();
        let needs_ticker = !batch.all_finished();
        shared.batch = batch;

        if needs_ticker {
            let token = CancellationToken::new();
            let task = self.runtime.spawn(run_ticker(
                self.ctx.clone(),
                shared.generation,
                self.interval,
                token.clone(),
            ));
            shared.ticker = Some(TickerHandle { token, task });
        }
        self.ctx.publish(&shared);
        drop(shared);

        engine_info!("Background processing started for {} items", count);
        self.ctx.emit(TrackerEvent::Started { items: count });
        Ok(())
    }

    /// Stops the ticker and forgets the batch.
    pub fn clear(&self) {
        let mut shared = self.ctx.lock();
        shared.stop_ticker();
        shared.generation += 1;
        shared.batch = ProcessingBatch::new();
        shared.is_active = false;
        self.ctx.publish(&shared);
        drop(shared);

        engine_info!("Background processing cleared");
        self.ctx.emit(TrackerEvent::Cleared);
    }

    /// Cancels the ticker without touching the batch.
    pub fn shutdown(&self) {
        let mut shared = self.ctx.lock();
        if shared.stop_ticker() {
            shared.generation += 1;
            engine_debug!("Background ticker cancelled on shutdown");
        }
    }
}

impl Drop for BackgroundTracker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_ticker(ctx: Context, generation: u64, period: Duration, token: CancellationToken) {
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = ticks.tick() => {}
        }

        let current = {
            let shared = ctx.lock();
            if shared.generation != generation {
                return;
            }
            shared.batch.clone()
        };

        let outcome = {
            let mut driver = ctx.driver.lock().await;
            tokio::select! {
                _ = token.cancelled() => return,
                outcome = driver.advance(&current) => outcome,
            }
        };

        if apply_tick(&ctx, generation, &token, &current, outcome) {
            return;
        }
    }
}

/// Installs a tick's result. Returns true once the ticker should stop.
fn apply_tick(
    ctx: &Context,
    generation: u64,
    token: &CancellationToken,
    previous: &ProcessingBatch,
    outcome: TickOutcome,
) -> bool {
    let mut events = Vec::new();
    let finished = {
        let mut shared = ctx.lock();
        if shared.generation != generation || token.is_cancelled() {
            return true;
        }

        for transition in &outcome.transitions {
            engine_debug!(
                "Background item {} moved {} -> {}",
                transition.id,
                transition.from,
                transition.to
            );
            events.push(TrackerEvent::StageChanged(*transition));
            if transition.to == Stage::Error {
                let message = outcome
                    .batch
                    .get(transition.id)
                    .and_then(|item| item.error_message.clone())
                    .unwrap_or_default();
                events.push(TrackerEvent::ItemFailed {
                    id: transition.id,
                    message,
                });
            }
        }

        if outcome.batch != *previous {
            shared.batch = outcome.batch;
        }
        if outcome.all_finished {
            // This task is the ticker being dropped; it exits right after.
            shared.ticker = None;
            let aggregate_progress = shared.batch.aggregate_progress();
            engine_info!(
                "All background items complete or failed ({:.1}%); ticker stopped",
                aggregate_progress
            );
            events.push(TrackerEvent::Finished { aggregate_progress });
        }
        ctx.publish(&shared);
        outcome.all_finished
    };

    for event in events {
        ctx.emit(event);
    }
    finished
}
