//! Generation pipeline for the ViralScript backend.
//!
//! This crate sequences one generation request end to end: resolve the
//! caller, enforce quota, extract transcripts concurrently, analyze
//! patterns, load accumulated intelligence, generate scripts, persist the
//! result and shape the response. All failure modes collapse into the
//! closed [`PipelineError`] taxonomy.

pub mod config;
pub mod error;
pub mod intelligence;
pub mod orchestrator;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use intelligence::load_intelligence;
pub use orchestrator::{Caller, GenerationPipeline};
