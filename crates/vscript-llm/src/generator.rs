//! Script generation conditioned on patterns, theme and history.

use tracing::{info, warn};

use vscript_models::script::filter_complete;
use vscript_models::{
    AccumulatedIntelligence, GenerationSettings, PatternAnalysis, ScriptVariant, ThemeInput,
    ThemeKind,
};

use crate::client::LanguageModel;
use crate::error::LlmResult;
use crate::parse;

/// Token ceiling for the generation call.
const GENERATION_MAX_TOKENS: u32 = 4000;

/// Ask the model for `settings.variant_count` ready-to-shoot scripts.
///
/// Variants missing a non-empty hook/body/CTA text are dropped, not errored;
/// the caller may receive fewer variants than requested, and an empty result
/// is still a successful call.
pub async fn generate_scripts(
    model: &dyn LanguageModel,
    analysis: Option<&PatternAnalysis>,
    theme: &ThemeInput,
    settings: &GenerationSettings,
    production_constraints: Option<&str>,
    intelligence: Option<&AccumulatedIntelligence>,
) -> LlmResult<Vec<ScriptVariant>> {
    let prompt = build_generation_prompt(analysis, theme, settings, production_constraints, intelligence);
    let response = model.complete(&prompt, GENERATION_MAX_TOKENS).await?;

    let value = parse::parse_array_span(&response).map_err(|e| {
        warn!(raw = %response, "Generation response could not be parsed");
        e
    })?;
    let items = value.as_array().cloned().unwrap_or_default();
    let parsed_count = items.len();

    let mut variants = Vec::with_capacity(parsed_count);
    for item in items {
        match serde_json::from_value::<ScriptVariant>(item) {
            Ok(variant) => variants.push(variant),
            Err(e) => warn!(error = %e, "Dropping unparseable variant"),
        }
    }

    let variants = filter_complete(variants);
    info!(
        requested = settings.variant_count,
        returned = parsed_count,
        valid = variants.len(),
        "Script generation complete"
    );
    Ok(variants)
}

/// Build the generation prompt. Block order is fixed: analysis (or the
/// no-reference instruction), theme, settings, optional hard constraints,
/// optional accumulated intelligence, then the output contract.
fn build_generation_prompt(
    analysis: Option<&PatternAnalysis>,
    theme: &ThemeInput,
    settings: &GenerationSettings,
    production_constraints: Option<&str>,
    intelligence: Option<&AccumulatedIntelligence>,
) -> String {
    let mut prompt = String::from("You are an expert copywriter for high-conversion videos.\n\n");

    match analysis {
        Some(analysis) => {
            let serialized = serde_json::to_string_pretty(analysis)
                .unwrap_or_else(|_| "{}".to_string());
            prompt.push_str("WINNING PATTERNS IDENTIFIED:\n");
            prompt.push_str(&serialized);
        }
        None => {
            prompt.push_str(
                "NO REFERENCE VIDEOS AVAILABLE:\nNo pattern analysis could be produced for \
                 this request. Rely on proven best practices for short-form video \
                 copywriting on the target platform.",
            );
            if intelligence.is_some() {
                prompt.push_str(
                    " Lean on the caller's past high-scoring scripts listed below as your \
                     strongest signal.",
                );
            }
        }
    }

    prompt.push_str("\n\nNEW PRODUCT/THEME:\n");
    match theme.kind {
        ThemeKind::Description => prompt.push_str(&theme.content),
        ThemeKind::Link => prompt.push_str(&format!("Link: {}", theme.content)),
    }
    if let Some(ref audience) = theme.target_audience {
        prompt.push_str(&format!("\nTarget audience: {audience}"));
    }
    if let Some(objective) = theme.objective {
        prompt.push_str(&format!("\nObjective: {objective}"));
    }

    prompt.push_str(&format!(
        "\n\nSETTINGS:\n- Duration: {}\n- Platform: {}\n- Number of variants: {}",
        settings.video_duration, settings.primary_platform, settings.variant_count
    ));

    if let Some(constraints) = production_constraints.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str(&format!(
            "\n\nPRODUCTION CONSTRAINTS (MANDATORY):\n{constraints}\nEvery returned variant \
             must be producible within these constraints."
        ));
    }

    if let Some(intelligence) = intelligence.filter(|i| !i.is_empty()) {
        let serialized = serde_json::to_string_pretty(&intelligence.top_variants)
            .unwrap_or_else(|_| "[]".to_string());
        prompt.push_str(&format!(
            "\n\nPAST HIGH-SCORING SCRIPTS ({} previous generations):\n{serialized}\nUse \
             these as a quality reference for what resonates with this caller's audience, \
             not as a template to copy.",
            intelligence.prior_generation_count
        ));
    }

    let count = settings.variant_count;
    prompt.push_str(&format!(
        r#"

Create {count} DIFFERENT scripts applying the winning patterns.

Return ONLY a valid JSON array (no markdown) with exactly {count} objects:
[
  {{
    "id": "script-1",
    "index": 1,
    "title": "Creative script name",
    "adherence_score": 9.2,
    "estimated_seconds": 60,
    "recommended_platforms": ["instagram", "tiktok"],
    "hook": {{
      "text": "Hook text here",
      "timing": "0-5s",
      "type": "provocative_question"
    }},
    "body": {{
      "text": "Body text here",
      "timing": "5-55s",
      "structure": "problem-agitation-solution",
      "key_points": ["point 1", "point 2", "point 3"]
    }},
    "cta": {{
      "text": "CTA text here",
      "timing": "55-60s",
      "type": "urgency"
    }},
    "production_direction": {{
      "camera_angles": {{"hook": "close-up", "body": "medium shot", "cta": "close-up"}},
      "lighting": "soft key light",
      "setting": "clean background",
      "vocal_tone": "energetic"
    }},
    "notes": "Why this script works"
  }}
]"#
    ));

    prompt
}
