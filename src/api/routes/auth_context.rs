//! Authentication context utilities.
//!
//! Provides the extractor that turns a bearer token into the caller's user id.

use super::app_state::AppState;
use super::error::ApiError;
use crate::services::{Claims, JwtService};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

/// Authentication context extracted from request
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: Uuid,
}

impl AuthContext {
    /// Validate a raw token and build the context from its claims.
    pub fn from_token(jwt: &JwtService, token: &str) -> Result<Self, ApiError> {
        let claims = jwt.validate(token).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            ApiError::unauthorized("Invalid or expired token")
        })?;
        Self::from_claims(claims)
    }

    fn from_claims(claims: Claims) -> Result<Self, ApiError> {
        let user_id = claims.user_id().ok_or_else(|| {
            tracing::warn!("JWT subject is not a user id: {}", claims.sub);
            ApiError::unauthorized("Invalid token subject")
        })?;
        Ok(Self { user_id })
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_bearer_token)
            .ok_or_else(|| {
                tracing::warn!("No authorization token provided");
                ApiError::unauthorized("Authorization required")
            })?;

        Self::from_token(&state.jwt, token)
    }
}
