//! Session resolution.
//!
//! Sessions are HS256 JWTs carrying the caller's id and email. Resolution
//! is optional: a missing or invalid token yields an anonymous caller, and
//! the pipeline decides whether anonymous access is allowed.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

use vscript_pipeline::Caller;

use crate::state::AppState;

/// JWT claims for session tokens.
#[derive(Debug, Deserialize)]
struct Claims {
    /// Caller id
    sub: String,
    email: String,
    #[allow(dead_code)]
    exp: i64,
}

/// Verifies session tokens against the shared secret.
pub struct SessionVerifier {
    secret: Option<String>,
}

impl SessionVerifier {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("SESSION_SECRET").ok())
    }

    /// Resolve the caller behind a request. Never fails: anything short of
    /// a valid token is an anonymous caller.
    pub fn resolve(&self, headers: &HeaderMap) -> Caller {
        let Some(secret) = self.secret.as_deref() else {
            return Caller::Anonymous;
        };
        let Some(token) = bearer_token(headers) else {
            return Caller::Anonymous;
        };

        // Validate with HS256 only to prevent algorithm confusion attacks
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
            Ok(data) => Caller::Session {
                id: data.claims.sub,
                email: data.claims.email,
            },
            Err(e) => {
                debug!(error = %e, "Session token rejected");
                Caller::Anonymous
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Extractor wrapping the resolved caller identity.
pub struct CallerIdentity(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CallerIdentity(state.verifier.resolve(&parts.headers)))
    }
}
