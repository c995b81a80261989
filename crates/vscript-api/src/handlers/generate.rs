//! Script generation handler.

use axum::extract::State;
use axum::Json;
use tracing::info;

use vscript_models::{GenerateRequest, GenerateResponse};

use crate::auth::CallerIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

/// Run the full generation pipeline for one request.
///
/// The pipeline owns validation, quota and persistence; this handler only
/// resolves the caller and translates errors into HTTP responses.
pub async fn generate(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    info!(
        videos = request.video_references.len(),
        variants = request.settings.variant_count,
        "Generation request received"
    );

    let response = state.pipeline.handle(caller.0, request).await?;
    Ok(Json(response))
}
