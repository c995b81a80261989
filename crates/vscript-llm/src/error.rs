//! Language-model error types.

use thiserror::Error;

/// Result type for language-model operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors from the language-model boundary.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The credential is checked at first use, not at startup.
    #[error("model credential not configured: {0}")]
    MissingCredential(&'static str),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    #[error("empty model response")]
    EmptyResponse,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl LlmError {
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedOutput(msg.into())
    }

    /// True when the provider error text signals an exhausted billing
    /// account. Matched by known substrings; operator-actionable, not
    /// caller-caused.
    pub fn is_billing_failure(&self) -> bool {
        match self {
            LlmError::Provider(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("credit balance is too low") || msg.contains("billing")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_detection() {
        assert!(LlmError::provider("Your credit balance is too low to access the API").is_billing_failure());
        assert!(LlmError::provider("400: billing hard limit reached").is_billing_failure());
        assert!(!LlmError::provider("overloaded_error: try again").is_billing_failure());
        assert!(!LlmError::malformed("no JSON").is_billing_failure());
        assert!(!LlmError::MissingCredential("ANTHROPIC_API_KEY").is_billing_failure());
    }
}
