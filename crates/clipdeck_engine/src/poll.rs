//! Status polling against a real processing service.
//!
//! Each tick asks the service for every unfinished item's stage. Transport
//! and decode failures fail only the affected item.

use clipdeck_core::{
    clamp_progress, ProcessingBatch, ProcessingItem, Stage, StageTransition, TickOutcome,
    UNKNOWN_FAILURE_MESSAGE,
};
use engine_logging::{engine_error, engine_warn};
use serde::Deserialize;
use url::Url;

use crate::http::{build_client, FetchSettings};
use crate::types::map_reqwest_error;
use crate::{FailureKind, FetchError, ProgressDriver};

/// Reply of `GET {base}/status/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusReply {
    pub stage: Stage,
    #[serde(default)]
    pub progress: f64,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusPollDriver {
    client: reqwest::Client,
    base_url: Url,
}

impl StatusPollDriver {
    pub fn new(base_url: &str, settings: &FetchSettings) -> Result<Self, FetchError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: build_client(settings)?,
            base_url,
        })
    }

    async fn poll(&self, item: &ProcessingItem) -> Result<StatusReply, FetchError> {
        let url = self
            .base_url
            .join(&format!("status/{}", item.id))
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::InvalidResponse, err.to_string()))
    }
}

/// Folds a status reply into `item` without moving it backwards.
pub fn apply_status(item: &ProcessingItem, reply: &StatusReply) -> ProcessingItem {
    let mut next = item.clone();
    match reply.stage {
        Stage::Error => {
            let message = reply
                .error
                .clone()
                .unwrap_or_else(|| UNKNOWN_FAILURE_MESSAGE.to_string());
            next.fail(message);
        }
        Stage::Complete => next.complete(),
        stage if stage == item.stage => {
            let progress = clamp_progress(reply.progress);
            next.local_progress = next.local_progress.max(progress);
        }
        stage if item.stage.can_move_to(stage) => {
            next.stage = stage;
            next.local_progress = clamp_progress(reply.progress);
        }
        stage => {
            engine_warn!(
                "Ignoring status for item {}: {} would regress from {}",
                item.id,
                stage,
                item.stage
            );
        }
    }
    next
}

#[async_trait::async_trait]
impl ProgressDriver for StatusPollDriver {
    async fn advance(&mut self, batch: &ProcessingBatch) -> TickOutcome {
        let mut items = Vec::with_capacity(batch.len());
        let mut transitions = Vec::new();

        for item in batch.items() {
            if item.is_finished() {
                items.push(item.clone());
                continue;
            }
            let next = match self.poll(item).await {
                Ok(reply) => apply_status(item, &reply),
                Err(err) => {
                    engine_warn!("Status poll failed for item {}: {}", item.id, err);
                    let mut failed = item.clone();
                    failed.fail(err.to_string());
                    failed
                }
            };
            if next.stage != item.stage {
                transitions.push(StageTransition {
                    id: item.id,
                    from: item.stage,
                    to: next.stage,
                });
            }
            items.push(next);
        }

        match ProcessingBatch::from_items(items) {
            Ok(next) => TickOutcome::new(next, transitions),
            Err(err) => {
                engine_error!("Status poll produced an invalid batch: {}", err);
                TickOutcome::new(batch.clone(), Vec::new())
            }
        }
    }
}
