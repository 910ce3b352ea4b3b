use clipdeck_core::{MetadataReply, VideoMetadata};
use engine_logging::engine_debug;
use url::Url;

use crate::http::{build_client, FetchSettings};
use crate::types::map_reqwest_error;
use crate::{FailureKind, FetchError};

/// Resolves a source URL into title, thumbnail and duration.
#[async_trait::async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, source_url: &str) -> Result<VideoMetadata, FetchError>;
}

/// Calls a metadata endpoint as `GET {endpoint}?url=<source>`.
#[derive(Debug, Clone)]
pub struct HttpMetadataFetcher {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpMetadataFetcher {
    pub fn new(endpoint: &str, settings: &FetchSettings) -> Result<Self, FetchError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        Ok(Self {
            client: build_client(settings)?,
            endpoint,
        })
    }

    fn request_url(&self, source_url: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("url", source_url);
        url
    }
}

#[async_trait::async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, source_url: &str) -> Result<VideoMetadata, FetchError> {
        if source_url.trim().is_empty() {
            return Err(FetchError::new(FailureKind::InvalidUrl, "Missing video URL"));
        }

        let url = self.request_url(source_url);
        engine_debug!("Fetching metadata via {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let reply = serde_json::from_slice::<MetadataReply>(&body);

        if !status.is_success() {
            let message = reply
                .ok()
                .and_then(|reply| reply.error)
                .unwrap_or_else(|| status.to_string());
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        let reply =
            reply.map_err(|err| FetchError::new(FailureKind::InvalidResponse, err.to_string()))?;
        reply
            .into_result()
            .map_err(|message| FetchError::new(FailureKind::Rejected, message))
    }
}
