use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::admin;
use super::auth;
use super::health;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Authentication endpoints (no auth required for login/verify)
        .nest("/auth", auth::create_auth_router())
        // User management
        .nest("/admin", admin::create_admin_router())
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
