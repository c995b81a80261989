//! Application state.

use std::sync::Arc;

use tracing::info;

use vscript_llm::AnthropicClient;
use vscript_models::CallerAccount;
use vscript_pipeline::{GenerationPipeline, PipelineConfig};
use vscript_store::MemoryStore;
use vscript_transcript::{TranscriptExtractor, YoutubeClient};

use crate::auth::SessionVerifier;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<GenerationPipeline>,
    pub verifier: Arc<SessionVerifier>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig, pipeline_config: PipelineConfig) -> Self {
        let model = Arc::new(AnthropicClient::new(
            pipeline_config.anthropic_api_key.clone(),
            pipeline_config.model.clone(),
        ));
        let store = Arc::new(MemoryStore::new());
        seed_account(&store).await;

        let extractor = TranscriptExtractor::new(Arc::new(YoutubeClient::new()));
        let pipeline = GenerationPipeline::new(pipeline_config, model, store, extractor);

        Self {
            config,
            pipeline: Arc::new(pipeline),
            verifier: Arc::new(SessionVerifier::from_env()),
        }
    }
}

/// Seed one caller account from the environment, if configured.
async fn seed_account(store: &MemoryStore) {
    let Ok(email) = std::env::var("SEED_CALLER_EMAIL") else {
        return;
    };
    let id = std::env::var("SEED_CALLER_ID").unwrap_or_else(|_| "seed-caller".to_string());
    info!(email = %email, "Seeding caller account from environment");
    store.upsert_account(CallerAccount::new(id, email)).await;
}
