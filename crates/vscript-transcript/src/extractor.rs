//! Best-effort transcript extraction.
//!
//! The extractor never fails: caption fetch falls back to oEmbed metadata,
//! and metadata failure falls back to empty text. The `fallback` flag tells
//! downstream consumers the text is degraded (title-only or empty) rather
//! than caption-derived.

use std::sync::Arc;

use tracing::{debug, warn};

use vscript_models::{extract_video_id, PlatformTag};

use crate::client::CaptionSource;

/// Extraction outcome for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    /// Degraded quality: text is title-derived or empty
    pub fallback: bool,
}

impl Transcript {
    fn captions(text: String) -> Self {
        Self {
            text,
            fallback: false,
        }
    }

    fn degraded(text: String) -> Self {
        Self {
            text,
            fallback: true,
        }
    }

    fn empty() -> Self {
        Self::degraded(String::new())
    }

    pub fn is_usable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Extracts best-effort text for YouTube reference videos.
#[derive(Clone)]
pub struct TranscriptExtractor {
    source: Arc<dyn CaptionSource>,
}

impl TranscriptExtractor {
    pub fn new(source: Arc<dyn CaptionSource>) -> Self {
        Self { source }
    }

    /// Extract text for a YouTube URL. Network and parsing failures degrade;
    /// this call never errors.
    pub async fn extract(&self, url: &str) -> Transcript {
        let Some(video_id) = extract_video_id(url) else {
            warn!(url, "No video id found in URL");
            return Transcript::empty();
        };

        match self.source.fetch_captions(&video_id).await {
            Ok(fragments) => {
                let text = fragments
                    .iter()
                    .map(|f| f.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                debug!(video_id, chars = text.len(), "Transcript from captions");
                Transcript::captions(text)
            }
            Err(e) => {
                warn!(video_id, error = %e, "Captions unavailable, trying metadata");
                match self.source.fetch_metadata(&video_id).await {
                    Ok(meta) => Transcript::degraded(format!(
                        "YouTube video \"{}\" by {}. Captions unavailable, analysis based on the video title.",
                        meta.title, meta.author
                    )),
                    Err(e) => {
                        warn!(video_id, error = %e, "Metadata unavailable");
                        Transcript::empty()
                    }
                }
            }
        }
    }
}

/// Fixed stand-in text for platforms without transcript support yet.
///
/// Audio transcription for Instagram/TikTok is intentionally mocked; this is
/// not a degraded path, so `fallback` stays false.
pub fn placeholder_transcript(platform: PlatformTag) -> Transcript {
    Transcript {
        text: format!(
            "{platform} video content: the creator presents high-engagement digital \
             marketing strategies, using storytelling, social proof and urgency to \
             convert the audience."
        ),
        fallback: false,
    }
}
