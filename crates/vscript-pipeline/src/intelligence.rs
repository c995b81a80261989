//! Accumulated-intelligence aggregation.
//!
//! Reads the caller's recent generation records and condenses their
//! high-scoring variants into a compact prompt block. Strictly best-effort:
//! any storage failure degrades to "no intelligence" and is never surfaced
//! to the caller.

use tracing::{info, warn};

use vscript_models::{AccumulatedIntelligence, CondensedVariant};
use vscript_store::GenerationStore;

/// How many recent generations to look back over.
const HISTORY_WINDOW: usize = 5;

/// Minimum adherence score for a variant to count as a past winner.
const TOP_SCORE_THRESHOLD: f64 = 8.0;

/// Cap per historical generation, preserving original order.
const TOP_VARIANTS_PER_RECORD: usize = 2;

/// Condense the caller's recent history into an intelligence summary.
///
/// Returns `None` when the caller has no history, no qualifying variants,
/// or the read fails.
pub async fn load_intelligence(
    store: &dyn GenerationStore,
    caller_id: &str,
) -> Option<AccumulatedIntelligence> {
    let records = match store
        .find_recent_generation_records(caller_id, HISTORY_WINDOW)
        .await
    {
        Ok(records) => records,
        Err(e) => {
            warn!(caller_id, error = %e, "Could not load accumulated intelligence");
            return None;
        }
    };

    if records.is_empty() {
        return None;
    }

    let prior_generation_count = records.len() as u32;
    let top_variants: Vec<CondensedVariant> = records
        .iter()
        .flat_map(|record| {
            record
                .variants
                .iter()
                .filter(|v| v.adherence_score >= TOP_SCORE_THRESHOLD)
                .take(TOP_VARIANTS_PER_RECORD)
                .map(CondensedVariant::from_variant)
        })
        .collect();

    if top_variants.is_empty() {
        return None;
    }

    info!(
        caller_id,
        generations = prior_generation_count,
        top_variants = top_variants.len(),
        "Loaded accumulated intelligence"
    );
    Some(AccumulatedIntelligence {
        prior_generation_count,
        top_variants,
    })
}
