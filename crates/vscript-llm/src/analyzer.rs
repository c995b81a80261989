//! Pattern analysis over reference transcripts.

use tracing::{info, warn};

use vscript_models::{PatternAnalysis, Transcription};

use crate::client::LanguageModel;
use crate::error::{LlmError, LlmResult};
use crate::parse;

/// Token ceiling for the analysis call.
const ANALYSIS_MAX_TOKENS: u32 = 2000;

/// Ask the model to identify winning patterns across the reference videos.
///
/// Expects a non-empty list of usable transcriptions. A malformed or missing
/// JSON object in the response is fatal to this call; the model is not
/// retried.
pub async fn analyze_patterns(
    model: &dyn LanguageModel,
    transcriptions: &[Transcription],
) -> LlmResult<PatternAnalysis> {
    let prompt = build_analysis_prompt(transcriptions);
    let response = model.complete(&prompt, ANALYSIS_MAX_TOKENS).await?;

    let value = parse::parse_object_span(&response).map_err(|e| {
        warn!(raw = %response, "Analysis response could not be parsed");
        e
    })?;
    let analysis: PatternAnalysis = serde_json::from_value(value)
        .map_err(|e| LlmError::malformed(format!("analysis schema: {e}")))?;

    info!(
        videos = transcriptions.len(),
        hook_patterns = analysis.hook_patterns.len(),
        "Pattern analysis complete"
    );
    Ok(analysis)
}

/// Build the analysis prompt: per-video texts labelled by platform and
/// ordinal, then the output contract.
fn build_analysis_prompt(transcriptions: &[Transcription]) -> String {
    let videos_text = transcriptions
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "VIDEO {} ({}):\n{}",
                i + 1,
                t.platform.as_str().to_uppercase(),
                t.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    let count = transcriptions.len();

    format!(
        r#"You are an expert copywriter for viral short-form videos.

REFERENCE VIDEOS:
{videos_text}

Analyze these {count} videos and identify the winning patterns.

Return ONLY a single valid JSON object (no markdown) with this schema:
{{
  "videos_analyzed": {count},
  "hook_patterns": [
    {{
      "type": "provocative_question",
      "frequency": "2/{count}",
      "avg_duration_seconds": 5,
      "examples": ["example 1"]
    }}
  ],
  "body_patterns": {{
    "dominant_structure": "problem-agitation-solution",
    "avg_key_points": 3,
    "common_elements": ["storytelling", "social_proof"]
  }},
  "cta_patterns": {{
    "dominant_type": "urgency",
    "typical_placement": "last_5-7s",
    "examples": ["CTA example"]
  }},
  "production_patterns": {{
    "visual_style": "fast cuts with on-screen captions"
  }}
}}"#
    )
}
