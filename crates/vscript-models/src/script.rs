//! Script variant models.
//!
//! Variants come back from the language model as loosely-shaped JSON, so
//! every field outside the hook/body/CTA texts is optional or defaulted.
//! Validation of the required texts happens at the parse boundary via
//! [`ScriptVariant::is_complete`].

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::platform::PlatformTag;

/// Opening section designed to arrest viewer attention.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HookSection {
    #[serde(default)]
    pub text: String,
    /// Timing window, e.g. "0-5s"
    #[serde(default)]
    pub timing: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub hook_type: Option<String>,
}

/// Main body of the script.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BodySection {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timing: String,
    /// Narrative structure, e.g. "problem-agitation-solution"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points: Option<Vec<String>>,
}

/// Closing call-to-action section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CtaSection {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timing: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub cta_type: Option<String>,
}

/// Camera direction per script section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SectionAngles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
}

/// Optional production guidance attached to a variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProductionDirection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_angles: Option<SectionAngles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocal_tone: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One complete hook+body+CTA script generated for the caller's theme.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScriptVariant {
    #[serde(default)]
    pub id: String,
    /// 1-based position within the generated batch
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub title: String,
    /// How closely the variant follows the identified patterns (0..10)
    #[serde(default)]
    pub adherence_score: f64,
    #[serde(default)]
    pub estimated_seconds: u32,
    #[serde(default, deserialize_with = "lenient_platform_list")]
    pub recommended_platforms: Vec<PlatformTag>,
    #[serde(default)]
    pub hook: HookSection,
    #[serde(default)]
    pub body: BodySection,
    #[serde(default)]
    pub cta: CtaSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_direction: Option<ProductionDirection>,
    #[serde(default)]
    pub notes: String,
}

impl ScriptVariant {
    /// A variant is usable only when all three required texts are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.hook.text.trim().is_empty()
            && !self.body.text.trim().is_empty()
            && !self.cta.text.trim().is_empty()
    }
}

/// Drop variants missing any required section text. Idempotent.
pub fn filter_complete(variants: Vec<ScriptVariant>) -> Vec<ScriptVariant> {
    variants.into_iter().filter(ScriptVariant::is_complete).collect()
}

/// Deserialize a platform list, dropping entries the model invented.
fn lenient_platform_list<'de, D>(deserializer: D) -> Result<Vec<PlatformTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer).unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|v| v.as_str().and_then(|s| s.parse().ok()))
        .collect())
}
