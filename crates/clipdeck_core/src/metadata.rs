//! Video metadata consumed when seeding an item's display name.
//!
//! The lookup itself happens elsewhere; this module only defines the reply
//! shape and the title used when a lookup yields none.

use serde::{Deserialize, Serialize};
use url::Url;

/// Title and details resolved for a source URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<u64>,
}

/// Wire shape returned by the metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataReply {
    #[serde(default)]
    pub success: bool,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(rename = "duration")]
    pub duration_seconds: Option<u64>,
    pub error: Option<String>,
}

impl MetadataReply {
    /// Splits the reply into metadata or the reported error message.
    pub fn into_result(self) -> Result<VideoMetadata, String> {
        if !self.success {
            return Err(self
                .error
                .unwrap_or_else(|| "Failed to fetch metadata".to_string()));
        }
        Ok(VideoMetadata {
            title: self.title,
            thumbnail_url: self.thumbnail_url,
            duration_seconds: self.duration_seconds,
        })
    }
}

/// Fallback label for a URL whose title could not be resolved.
pub fn fallback_title(raw: &str) -> String {
    match Url::parse(raw.trim()).ok().and_then(|u| u.host_str().map(str::to_owned)) {
        Some(host) => format!("Video from {host}"),
        None => "Untitled Project".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_reply_carries_message() {
        let reply: MetadataReply =
            serde_json::from_str(r#"{"error":"Video not found or unavailable"}"#).unwrap();
        assert_eq!(
            reply.into_result(),
            Err("Video not found or unavailable".to_string())
        );
    }

    #[test]
    fn successful_reply_maps_fields() {
        let reply: MetadataReply = serde_json::from_str(
            r#"{"success":true,"title":"Keynote","thumbnailUrl":null,"duration":754}"#,
        )
        .unwrap();
        let metadata = reply.into_result().unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Keynote"));
        assert_eq!(metadata.thumbnail_url, None);
        assert_eq!(metadata.duration_seconds, Some(754));
    }

    #[test]
    fn fallback_title_uses_host() {
        assert_eq!(fallback_title("https://vimeo.com/1"), "Video from vimeo.com");
        assert_eq!(fallback_title("???"), "Untitled Project");
    }
}
