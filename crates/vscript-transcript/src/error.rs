//! Transcript error types.

use thiserror::Error;

/// Result type for transcript operations.
pub type TranscriptResult<T> = Result<T, TranscriptError>;

/// Errors from the video platform boundary.
///
/// These never cross the extractor's boundary: the extractor converts every
/// failure into a degraded [`crate::Transcript`].
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("captions unavailable for video {0}")]
    CaptionsUnavailable(String),

    #[error("metadata unavailable for video {0}")]
    MetadataUnavailable(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
