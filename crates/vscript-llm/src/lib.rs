//! Language-model integration for script generation.
//!
//! This crate provides:
//! - The [`LanguageModel`] boundary and a reqwest-backed [`AnthropicClient`]
//! - Pattern analysis over reference transcripts
//! - Script generation conditioned on patterns, theme, settings,
//!   production constraints and accumulated intelligence
//! - Strict output-contract parsing with a single best-effort repair pass

pub mod analyzer;
pub mod client;
pub mod error;
pub mod generator;
pub mod parse;

pub use analyzer::analyze_patterns;
pub use client::{AnthropicClient, LanguageModel};
pub use error::{LlmError, LlmResult};
pub use generator::generate_scripts;
