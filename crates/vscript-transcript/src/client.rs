//! YouTube caption and oEmbed client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{TranscriptError, TranscriptResult};

/// One time-coded caption fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionFragment {
    pub start_ms: u64,
    pub text: String,
}

/// Public metadata for a video, from the oEmbed endpoint.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub title: String,
    pub author: String,
}

/// Boundary over the platform's caption and metadata endpoints.
///
/// Both calls are fallible; the extractor decides how failures degrade.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch time-coded captions for a video id.
    async fn fetch_captions(&self, video_id: &str) -> TranscriptResult<Vec<CaptionFragment>>;

    /// Fetch public title/author metadata for a video id.
    async fn fetch_metadata(&self, video_id: &str) -> TranscriptResult<VideoMetadata>;
}

/// Reqwest-backed client for YouTube's public endpoints.
pub struct YoutubeClient {
    base_url: String,
    client: reqwest::Client,
}

impl YoutubeClient {
    pub fn new() -> Self {
        Self::with_base_url("https://www.youtube.com")
    }

    /// Override the base URL (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for YoutubeClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Timedtext response in `fmt=json3` shape.
#[derive(Debug, Deserialize)]
struct TimedTextResponse {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

/// oEmbed response; only title and author matter here.
#[derive(Debug, Deserialize)]
struct OembedResponse {
    title: String,
    author_name: String,
}

#[async_trait]
impl CaptionSource for YoutubeClient {
    async fn fetch_captions(&self, video_id: &str) -> TranscriptResult<Vec<CaptionFragment>> {
        let url = format!("{}/api/timedtext", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("v", video_id), ("lang", "en"), ("fmt", "json3")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranscriptError::CaptionsUnavailable(video_id.to_string()));
        }

        // The endpoint answers 200 with an empty body when captions are
        // disabled for the video.
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(TranscriptError::CaptionsUnavailable(video_id.to_string()));
        }

        let parsed: TimedTextResponse = serde_json::from_str(&body)
            .map_err(|e| TranscriptError::InvalidResponse(format!("timedtext: {e}")))?;

        let mut fragments: Vec<CaptionFragment> = parsed
            .events
            .into_iter()
            .filter_map(|event| {
                let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if text.is_empty() {
                    None
                } else {
                    Some(CaptionFragment {
                        start_ms: event.start_ms,
                        text,
                    })
                }
            })
            .collect();

        if fragments.is_empty() {
            return Err(TranscriptError::CaptionsUnavailable(video_id.to_string()));
        }

        fragments.sort_by_key(|f| f.start_ms);
        debug!(video_id, fragments = fragments.len(), "Fetched captions");
        Ok(fragments)
    }

    async fn fetch_metadata(&self, video_id: &str) -> TranscriptResult<VideoMetadata> {
        let url = format!("{}/oembed", self.base_url);
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        let response = self
            .client
            .get(&url)
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranscriptError::MetadataUnavailable(video_id.to_string()));
        }

        let parsed: OembedResponse = response
            .json()
            .await
            .map_err(|e| TranscriptError::InvalidResponse(format!("oembed: {e}")))?;

        Ok(VideoMetadata {
            title: parsed.title,
            author: parsed.author_name,
        })
    }
}
