//! Pattern analysis payloads returned by the language model.
//!
//! The analysis is produced by a non-deterministic external producer, so
//! every field is optional or defaulted and unknown keys are preserved in
//! `extra` for re-serialization into the generation prompt.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::platform::PlatformTag;

/// Per-video text fed into pattern analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Transcription {
    pub platform: PlatformTag,
    pub text: String,
}

impl Transcription {
    pub fn new(platform: PlatformTag, text: impl Into<String>) -> Self {
        Self {
            platform,
            text: text.into(),
        }
    }

    /// Empty text means the transcript was unusable.
    pub fn is_usable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// One recurring hook pattern identified across reference videos.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HookPattern {
    /// Pattern label, e.g. "provocative_question"
    #[serde(default, rename = "type")]
    pub kind: String,
    /// How often the pattern appeared, e.g. "2/3"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_duration_seconds: Option<f64>,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Body structure patterns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BodyPatterns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_structure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_key_points: Option<u32>,
    #[serde(default)]
    pub common_elements: Vec<String>,
}

/// Call-to-action patterns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CtaPatterns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_type: Option<String>,
    /// Where in the video the CTA lands, e.g. "last_5-7s"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typical_placement: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Winning patterns identified from the reference videos.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PatternAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos_analyzed: Option<u32>,
    #[serde(default)]
    pub hook_patterns: Vec<HookPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_patterns: Option<BodyPatterns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_patterns: Option<CtaPatterns>,
    /// Visual/production patterns, schema left to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_patterns: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
