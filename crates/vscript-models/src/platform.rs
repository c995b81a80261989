//! Platform classification for short-form video URLs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a URL matches none of the known platforms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized video platform: {url}")]
pub struct UnrecognizedPlatform {
    /// The URL that failed classification
    pub url: String,
}

/// Supported short-form video platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTag {
    Youtube,
    Instagram,
    Tiktok,
}

/// Host fragments checked in priority order. First match wins.
const HOST_RULES: &[(&[&str], PlatformTag)] = &[
    (&["youtube.com", "youtu.be"], PlatformTag::Youtube),
    (&["instagram.com"], PlatformTag::Instagram),
    (&["tiktok.com"], PlatformTag::Tiktok),
];

impl PlatformTag {
    /// Classify a URL by substring match against known host fragments.
    pub fn identify(url: &str) -> Result<Self, UnrecognizedPlatform> {
        let lowered = url.trim().to_ascii_lowercase();
        for (fragments, tag) in HOST_RULES {
            if fragments.iter().any(|f| lowered.contains(f)) {
                return Ok(*tag);
            }
        }
        Err(UnrecognizedPlatform {
            url: url.to_string(),
        })
    }

    /// Lowercase name as used in prompts and serialized payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformTag::Youtube => "youtube",
            PlatformTag::Instagram => "instagram",
            PlatformTag::Tiktok => "tiktok",
        }
    }
}

impl std::fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlatformTag {
    type Err = UnrecognizedPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube" => Ok(PlatformTag::Youtube),
            "instagram" => Ok(PlatformTag::Instagram),
            "tiktok" => Ok(PlatformTag::Tiktok),
            _ => Err(UnrecognizedPlatform { url: s.to_string() }),
        }
    }
}

/// Primary target platform for a generation, including the "all" wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryPlatform {
    Youtube,
    Instagram,
    Tiktok,
    All,
}

impl std::fmt::Display for PrimaryPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PrimaryPlatform::Youtube => "youtube",
            PrimaryPlatform::Instagram => "instagram",
            PrimaryPlatform::Tiktok => "tiktok",
            PrimaryPlatform::All => "all",
        };
        f.write_str(name)
    }
}
