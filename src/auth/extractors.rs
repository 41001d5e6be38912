use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tracing::warn;

use crate::state::AppState;

/// Extracts and verifies the bearer token, yielding the subject email.
/// Gated handlers are never reached with an invalid or expired token.
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((
                StatusCode::BAD_REQUEST,
                "missing Authorization header".to_string(),
            ))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or((StatusCode::BAD_REQUEST, "invalid auth scheme".to_string()))?;

        let claims = state.tokens.verify_token(token).map_err(|e| {
            warn!(error = %e, "rejected bearer token");
            (StatusCode::BAD_REQUEST, e.to_string())
        })?;

        Ok(AuthUser(claims.sub))
    }
}
