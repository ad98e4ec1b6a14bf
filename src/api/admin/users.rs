//! User management endpoints

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::api::auth::UserResponse;
use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::UserStatus;
use crate::infrastructure::user::CreateUserRequest;

/// Query parameters for listing users
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub status: Option<UserStatus>,
}

/// Response for listing users
#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

/// List users
///
/// GET /admin/users
pub async fn list_users(
    _auth: RequireUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UsersListResponse>, ApiError> {
    let users = state.user_service.list(query.status).await?;

    let users: Vec<UserResponse> = users.iter().map(UserResponse::from_user).collect();
    let total = users.len();

    Ok(Json(UsersListResponse { users, total }))
}

/// Request body for creating a user
#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub id: String,
    pub username: String,
    pub password: String,
}

/// Create a user
///
/// POST /admin/users
pub async fn create_user(
    _auth: RequireUser,
    State(state): State<AppState>,
    Json(body): Json<CreateUserBody>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .create(CreateUserRequest {
            id: body.id,
            username: body.username,
            password: body.password,
        })
        .await?;

    Ok(Json(UserResponse::from_user(&user)))
}

/// Get a user by ID
///
/// GET /admin/users/{user_id}
pub async fn get_user(
    _auth: RequireUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", user_id)))?;

    Ok(Json(UserResponse::from_user(&user)))
}

/// Deletion response
#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub deleted: bool,
}

/// Delete a user
///
/// DELETE /admin/users/{user_id}
pub async fn delete_user(
    _auth: RequireUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let deleted = state.user_service.delete(&user_id).await?;

    if !deleted {
        return Err(ApiError::not_found(format!(
            "User '{}' not found",
            user_id
        )));
    }

    Ok(Json(DeleteUserResponse { deleted }))
}

/// Suspend a user
///
/// POST /admin/users/{user_id}/suspend
pub async fn suspend_user(
    _auth: RequireUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.suspend(&user_id).await?;

    Ok(Json(UserResponse::from_user(&user)))
}

/// Activate a suspended user
///
/// POST /admin/users/{user_id}/activate
pub async fn activate_user(
    _auth: RequireUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.activate(&user_id).await?;

    Ok(Json(UserResponse::from_user(&user)))
}
