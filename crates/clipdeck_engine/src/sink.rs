use std::sync::mpsc;

use crate::TrackerEvent;

/// Receives tracker events. Implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: TrackerEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<TrackerEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<TrackerEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: TrackerEvent) {
        let _ = self.tx.send(event);
    }
}
