//! Admin API endpoints for managing users

pub mod users;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/{user_id}", get(users::get_user))
        .route("/users/{user_id}", delete(users::delete_user))
        .route("/users/{user_id}/suspend", post(users::suspend_user))
        .route("/users/{user_id}/activate", post(users::activate_user))
}
