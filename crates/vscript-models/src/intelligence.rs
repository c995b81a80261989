//! Accumulated intelligence condensed from a caller's past generations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::script::ScriptVariant;

/// Compact projection of a past high-scoring variant.
///
/// Only the structural signal survives: full texts stay in storage, the
/// prompt gets the shape of what worked.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CondensedVariant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_type: Option<String>,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CondensedVariant {
    /// Project a stored variant down to its reusable signal.
    pub fn from_variant(variant: &ScriptVariant) -> Self {
        Self {
            hook: non_empty(&variant.hook.text),
            hook_type: variant.hook.hook_type.clone(),
            structure: variant.body.structure.clone(),
            cta_type: variant.cta.cta_type.clone(),
            score: variant.adherence_score,
            notes: non_empty(&variant.notes),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Condensed record of the caller's historically high-scoring variants.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AccumulatedIntelligence {
    /// Number of past generations the summary was built from
    pub prior_generation_count: u32,
    pub top_variants: Vec<CondensedVariant>,
}

impl AccumulatedIntelligence {
    pub fn is_empty(&self) -> bool {
        self.top_variants.is_empty()
    }
}
