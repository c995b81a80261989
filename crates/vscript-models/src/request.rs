//! Request and response shapes for the generation endpoint.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::analysis::PatternAnalysis;
use crate::platform::PlatformTag;
use crate::script::ScriptVariant;
use crate::theme::{GenerationSettings, ThemeInput};

/// A reference video supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoReference {
    pub url: String,
    /// Inferred from the URL when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformTag>,
}

impl VideoReference {
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Request accepted by the generation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct GenerateRequest {
    #[serde(default)]
    pub video_references: Vec<VideoReference>,
    #[validate(nested)]
    pub theme: ThemeInput,
    #[validate(nested)]
    pub settings: GenerationSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_constraints: Option<String>,
}

impl GenerateRequest {
    /// References with a non-blank URL, in request order.
    pub fn usable_references(&self) -> Vec<&VideoReference> {
        self.video_references.iter().filter(|v| v.has_url()).collect()
    }
}

/// Quota usage reported back to the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct UsageInfo {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
}

/// Successful generation response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerateResponse {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<PatternAnalysis>,
    pub variants: Vec<ScriptVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    pub usage: UsageInfo,
}
