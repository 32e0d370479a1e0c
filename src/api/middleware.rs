use crate::api::albums::AppState;
use crate::error::{AppError, Result};
use crate::services::auth::Claims;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use std::sync::Arc;

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
}

/// Extracts verified claims, rejecting requests without a valid bearer token.
pub struct RequireUser(pub Claims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Unauthorized("Authorization header required".to_string())
        })?;

        let claims = state.verifier.verify(&token)?;

        Ok(RequireUser(claims))
    }
}

/// The raw bearer credential, if the request carried one. Verification is
/// left to the handler, which may not need the credential at all.
pub struct BearerToken(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Infallible> {
        Ok(BearerToken(bearer_token(parts)))
    }
}
