//! Pipeline error taxonomy.
//!
//! Every failure mode a request can hit maps into exactly one of these
//! variants; the HTTP layer translates them into user-facing responses
//! without leaking internal detail.

use chrono::{DateTime, Utc};
use thiserror::Error;

use vscript_llm::LlmError;
use vscript_store::StoreError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Non-fatal business condition; never retried automatically.
    #[error("monthly generation limit reached ({used}/{limit})")]
    QuotaExceeded {
        used: u32,
        limit: u32,
        reset_at: DateTime<Utc>,
    },

    #[error("validation error: {0}")]
    Validation(String),

    /// Parse and repair both failed on a model response.
    #[error("model output malformed: {0}")]
    ModelOutputMalformed(String),

    /// Operator-actionable provider condition, not caller-caused.
    #[error("provider billing failure: {0}")]
    ProviderBilling(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        if err.is_billing_failure() {
            return PipelineError::ProviderBilling(err.to_string());
        }
        match err {
            LlmError::MalformedOutput(msg) => PipelineError::ModelOutputMalformed(msg),
            other => PipelineError::Unexpected(other.to_string()),
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        PipelineError::Unexpected(err.to_string())
    }
}
