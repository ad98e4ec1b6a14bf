//! Authentication API endpoints
//!
//! Provides login, token verification, and user info endpoints.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::auth::TokenError;
use crate::infrastructure::user::UpdatePasswordRequest;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/verify", get(verify))
        .route("/me", get(get_current_user))
        .route("/password", post(change_password))
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: String,
    pub user: UserResponse,
}

/// User response (safe to expose)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub status: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl UserResponse {
    pub(crate) fn from_user(user: &crate::domain::user::User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            username: user.username().to_string(),
            status: format!("{:?}", user.status()).to_lowercase(),
            created_at: user.created_at().to_rfc3339(),
            last_login_at: user.last_login_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// Login with username and password
///
/// POST /auth/login
///
/// Returns a signed bearer token on successful authentication. Unknown
/// usernames and wrong passwords get the same response.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&request.username, &request.password)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("Incorrect username or password"))?;

    let token = state
        .token_service
        .issue(user.username())
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let expires_at = Utc::now() + Duration::minutes(state.token_service.ttl_minutes());

    Ok(Json(LoginResponse {
        token,
        token_type: "bearer".to_string(),
        expires_at: expires_at.to_rfc3339(),
        user: UserResponse::from_user(&user),
    }))
}

/// Verification response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Verify a presented token
///
/// GET /auth/verify
///
/// Reads the token from a `token` header or the `Authorization` header (a
/// `Bearer ` prefix is tolerated either way) and reports whether its
/// signature and expiry check out. A failed verification is a normal
/// response, not an error status.
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Json<VerifyResponse> {
    let token = headers
        .get("token")
        .or_else(|| headers.get(axum::http::header::AUTHORIZATION))
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match state.token_service.validate(token) {
        Ok(claims) => Json(VerifyResponse {
            valid: true,
            user: Some(claims.subject().to_string()),
            detail: None,
        }),
        Err(TokenError::Missing) => Json(VerifyResponse {
            valid: false,
            user: None,
            detail: Some("Token missing".to_string()),
        }),
        Err(e) => Json(VerifyResponse {
            valid: false,
            user: None,
            detail: Some(e.to_string()),
        }),
    }
}

/// Logout (client-side only for stateless tokens)
///
/// POST /auth/logout
///
/// Tokens are stateless; logout is handled client-side by discarding the
/// token. This endpoint exists for API consistency.
pub async fn logout(_user: RequireUser) -> Result<Json<LogoutResponse>, ApiError> {
    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Get current authenticated user
///
/// GET /auth/me
pub async fn get_current_user(
    RequireUser(user): RequireUser,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse::from_user(&user)))
}

/// Password change request
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Change the authenticated user's password
///
/// POST /auth/password
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state
        .user_service
        .update_password(
            user.id().as_str(),
            UpdatePasswordRequest {
                current_password: request.current_password,
                new_password: request.new_password,
            },
        )
        .await?;

    Ok(Json(UserResponse::from_user(&updated)))
}
