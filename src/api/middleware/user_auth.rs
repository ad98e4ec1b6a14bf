//! User authentication middleware using signed bearer tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;
use crate::infrastructure::auth::TokenError;

/// Extractor that requires a valid bearer token
///
/// Extracts the token from the `Authorization: Bearer <token>` header,
/// validates it, and resolves the subject to an active user.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        debug!("Validating bearer token");

        let claims = state.token_service.validate(&token).map_err(|e| match e {
            TokenError::Missing => ApiError::unauthorized("Token missing"),
            _ => ApiError::unauthorized(format!("Invalid token: {}", e)),
        })?;

        let user = state
            .user_service
            .get_by_username(claims.subject())
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;

        if !user.is_active() {
            return Err(ApiError::unauthorized("User account is suspended"));
        }

        Ok(RequireUser(user))
    }
}

/// Extract a bearer token from the Authorization header
pub fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide a token via 'Authorization: Bearer <token>' header",
    ))
}
