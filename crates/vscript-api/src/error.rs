//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use vscript_pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Monthly generation limit reached")]
    QuotaExceeded {
        used: u32,
        limit: u32,
        reset_at: DateTime<Utc>,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Unauthenticated(msg) => ApiError::Unauthorized(msg),
            PipelineError::QuotaExceeded {
                used,
                limit,
                reset_at,
            } => ApiError::QuotaExceeded {
                used,
                limit,
                reset_at,
            },
            PipelineError::Validation(msg) => ApiError::BadRequest(msg),
            PipelineError::ModelOutputMalformed(msg) => {
                error!(detail = %msg, "Model output could not be parsed");
                ApiError::Internal(format!("model output malformed: {msg}"))
            }
            PipelineError::ProviderBilling(msg) => {
                error!(detail = %msg, "Provider billing failure");
                ApiError::ServiceUnavailable(
                    "Script generation is temporarily unavailable. Please contact the \
                     administrator."
                        .to_string(),
                )
            }
            PipelineError::Unexpected(msg) => {
                error!(detail = %msg, "Unexpected pipeline error");
                ApiError::Internal(msg)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let details = match &self {
            ApiError::QuotaExceeded {
                used,
                limit,
                reset_at,
            } => Some(serde_json::json!({
                "generations_used": used,
                "limit": limit,
                "reset_date": reset_at.to_rfc3339(),
            })),
            _ => None,
        };

        // Don't expose internal error details in production
        let message = match &self {
            ApiError::Internal(_)
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" =>
            {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            details,
        };

        (status, Json(body)).into_response()
    }
}
