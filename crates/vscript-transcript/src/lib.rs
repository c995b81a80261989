//! Transcript acquisition for reference videos.
//!
//! This crate provides:
//! - The [`CaptionSource`] boundary over the video platform's caption and
//!   oEmbed endpoints
//! - A reqwest-backed [`YoutubeClient`]
//! - The [`TranscriptExtractor`], which degrades gracefully instead of
//!   erroring: captions, then title metadata, then empty text

pub mod client;
pub mod error;
pub mod extractor;

pub use client::{CaptionFragment, CaptionSource, VideoMetadata, YoutubeClient};
pub use error::{TranscriptError, TranscriptResult};
pub use extractor::{placeholder_transcript, Transcript, TranscriptExtractor};
