//! Theme input and generation settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::platform::PrimaryPlatform;

/// Minimum length for a free-text theme description.
pub const MIN_DESCRIPTION_CHARS: usize = 20;

/// How the theme content should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    /// Free-text description of the product or topic
    Description,
    /// URL pointing at the product or topic
    Link,
}

/// Marketing objective for the generated scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    Leads,
    Sale,
    Engagement,
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Objective::Leads => "leads",
            Objective::Sale => "sale",
            Objective::Engagement => "engagement",
        };
        f.write_str(name)
    }
}

/// Theme supplied by the caller for a generation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[validate(schema(function = "validate_theme_input"))]
pub struct ThemeInput {
    pub kind: ThemeKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<Objective>,
}

/// A description theme needs enough text to condition the model on; a link
/// theme only needs to be non-blank.
fn validate_theme_input(theme: &ThemeInput) -> Result<(), ValidationError> {
    let content = theme.content.trim();
    match theme.kind {
        ThemeKind::Description if content.chars().count() < MIN_DESCRIPTION_CHARS => {
            let mut err = ValidationError::new("theme_too_short");
            err.message = Some("describe the theme with at least 20 characters".into());
            Err(err)
        }
        _ if content.is_empty() => {
            let mut err = ValidationError::new("theme_empty");
            err.message = Some("theme content must not be empty".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Target video duration bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum VideoDuration {
    #[serde(rename = "15-30s")]
    Short,
    #[serde(rename = "30-60s")]
    Standard,
    #[serde(rename = "60-90s")]
    Long,
    #[serde(rename = "90s+")]
    Extended,
}

impl std::fmt::Display for VideoDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            VideoDuration::Short => "15-30s",
            VideoDuration::Standard => "30-60s",
            VideoDuration::Long => "60-90s",
            VideoDuration::Extended => "90s+",
        };
        f.write_str(label)
    }
}

/// Settings controlling one generation run.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct GenerationSettings {
    /// Number of distinct script variants requested from the model
    #[validate(range(min = 5, max = 10))]
    pub variant_count: u8,
    pub video_duration: VideoDuration,
    pub primary_platform: PrimaryPlatform,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(kind: ThemeKind, content: &str) -> ThemeInput {
        ThemeInput {
            kind,
            content: content.to_string(),
            target_audience: None,
            objective: None,
        }
    }

    #[test]
    fn test_description_requires_twenty_chars() {
        // 19 characters: rejected
        let short = theme(ThemeKind::Description, "exactly nineteen ch");
        assert!(short.validate().is_err());

        // 20 characters: accepted
        let ok = theme(ThemeKind::Description, "exactly twenty chars");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_description_length_ignores_padding() {
        let padded = theme(ThemeKind::Description, "   short theme      ");
        assert!(padded.validate().is_err());
    }

    #[test]
    fn test_link_only_requires_non_blank() {
        assert!(theme(ThemeKind::Link, "https://example.com/p").validate().is_ok());
        assert!(theme(ThemeKind::Link, "x").validate().is_ok());
        assert!(theme(ThemeKind::Link, "   ").validate().is_err());
    }

    #[test]
    fn test_settings_variant_count_bounds() {
        let mut settings = GenerationSettings {
            variant_count: 5,
            video_duration: VideoDuration::Standard,
            primary_platform: PrimaryPlatform::All,
        };
        assert!(settings.validate().is_ok());

        settings.variant_count = 10;
        assert!(settings.validate().is_ok());

        settings.variant_count = 4;
        assert!(settings.validate().is_err());

        settings.variant_count = 11;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_duration_serde_labels() {
        let json = serde_json::to_string(&VideoDuration::Extended).unwrap();
        assert_eq!(json, r#""90s+""#);
        let parsed: VideoDuration = serde_json::from_str(r#""30-60s""#).unwrap();
        assert_eq!(parsed, VideoDuration::Standard);
    }
}
