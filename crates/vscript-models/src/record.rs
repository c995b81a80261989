//! Persisted records: generation results and caller accounts.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::PatternAnalysis;
use crate::script::ScriptVariant;
use crate::theme::{GenerationSettings, ThemeInput};

/// One finished generation as stored for the caller.
///
/// Created exactly once per successful generation and never mutated; later
/// reads feed the intelligence aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerationRecord {
    pub id: String,
    pub caller_id: String,
    pub theme: ThemeInput,
    pub settings: GenerationSettings,
    pub variants: Vec<ScriptVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<PatternAnalysis>,
    pub created_at: DateTime<Utc>,
}

impl GenerationRecord {
    /// Create a record with a fresh id and the current timestamp.
    pub fn new(
        caller_id: impl Into<String>,
        theme: ThemeInput,
        settings: GenerationSettings,
        variants: Vec<ScriptVariant>,
        analysis: Option<PatternAnalysis>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            caller_id: caller_id.into(),
            theme,
            settings,
            variants,
            analysis,
            created_at: Utc::now(),
        }
    }
}

/// A caller known to the store, with their monthly quota state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CallerAccount {
    pub id: String,
    pub email: String,
    /// Generations consumed since `period_start`
    #[serde(default)]
    pub generations_used: u32,
    /// Start of the current quota period
    pub period_start: DateTime<Utc>,
}

impl CallerAccount {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            generations_used: 0,
            period_start: Utc::now(),
        }
    }
}

/// First day of the calendar month following `period_start`, at midnight UTC.
///
/// This is when the monthly generation counter resets.
pub fn quota_reset_date(period_start: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if period_start.month() == 12 {
        (period_start.year() + 1, 1)
    } else {
        (period_start.year(), period_start.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(period_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_date_mid_month() {
        let start = Utc.with_ymd_and_hms(2024, 3, 17, 14, 30, 0).unwrap();
        let reset = quota_reset_date(start);
        assert_eq!(reset, Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_reset_date_wraps_year() {
        let start = Utc.with_ymd_and_hms(2024, 12, 2, 0, 0, 0).unwrap();
        let reset = quota_reset_date(start);
        assert_eq!(reset, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_reset_date_first_of_month() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let reset = quota_reset_date(start);
        assert_eq!(reset, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_record_ids_are_unique() {
        let theme = ThemeInput {
            kind: crate::theme::ThemeKind::Description,
            content: "a theme that is long enough".to_string(),
            target_audience: None,
            objective: None,
        };
        let settings = GenerationSettings {
            variant_count: 5,
            video_duration: crate::theme::VideoDuration::Standard,
            primary_platform: crate::platform::PrimaryPlatform::All,
        };
        let a = GenerationRecord::new("u1", theme.clone(), settings.clone(), vec![], None);
        let b = GenerationRecord::new("u1", theme, settings, vec![], None);
        assert_ne!(a.id, b.id);
    }
}
