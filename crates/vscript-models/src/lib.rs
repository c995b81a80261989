//! Shared data models for the ViralScript backend.
//!
//! This crate provides Serde-serializable types for:
//! - Platform classification and YouTube URL parsing
//! - Themes, generation settings and request validation
//! - Script variants with their hook/body/CTA sections
//! - Pattern analysis payloads returned by the language model
//! - Accumulated intelligence condensed from past generations
//! - Persisted generation records and caller accounts

pub mod analysis;
pub mod intelligence;
pub mod platform;
pub mod record;
pub mod request;
pub mod script;
pub mod theme;
pub mod utils;

// Re-export common types
pub use analysis::{BodyPatterns, CtaPatterns, HookPattern, PatternAnalysis, Transcription};
pub use intelligence::{AccumulatedIntelligence, CondensedVariant};
pub use platform::{PlatformTag, PrimaryPlatform, UnrecognizedPlatform};
pub use record::{quota_reset_date, CallerAccount, GenerationRecord};
pub use request::{GenerateRequest, GenerateResponse, UsageInfo, VideoReference};
pub use script::{BodySection, CtaSection, HookSection, ProductionDirection, ScriptVariant};
pub use theme::{GenerationSettings, Objective, ThemeInput, ThemeKind, VideoDuration};
pub use utils::extract_video_id;
