//! Pipeline configuration.

/// Default monthly ceiling; effectively unlimited for small deployments.
const DEFAULT_MONTHLY_LIMIT: u32 = 999;

/// Default model used for both pipeline calls.
const DEFAULT_MODEL: &str = "claude-haiku-4-5";

/// Process-wide pipeline settings, built once at startup and passed down.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Monthly generation ceiling per caller
    pub monthly_generation_limit: u32,
    /// Reject requests without a resolvable caller
    pub require_caller: bool,
    /// Provider credential; checked at first model use, not at startup
    pub anthropic_api_key: Option<String>,
    /// Model identifier sent to the provider
    pub model: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            monthly_generation_limit: DEFAULT_MONTHLY_LIMIT,
            require_caller: false,
            anthropic_api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            monthly_generation_limit: std::env::var("MAX_GENERATIONS_PER_MONTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MONTHLY_LIMIT),
            require_caller: std::env::var("REQUIRE_CALLER")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            model: std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }
}
