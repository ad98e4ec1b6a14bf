//! Token Issuer
//!
//! A minimal credential-issuance service: authenticates username/password
//! pairs against the user store, issues signed, time-limited bearer tokens,
//! and verifies presented tokens. Meant to sit behind a gateway that does
//! the request-time enforcement.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AppState, UserServiceTrait};
use infrastructure::auth::{TokenConfig, TokenIssuer, TokenService};
use infrastructure::user::{Argon2Hasher, CreateUserRequest, InMemoryUserRepository, UserService};
use rand::Rng;
use tracing::info;

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let token_service = create_token_service(config)?;

    let user_repository = Arc::new(InMemoryUserRepository::new());
    let password_hasher = Arc::new(Argon2Hasher::new());
    let user_service: Arc<dyn UserServiceTrait> =
        Arc::new(UserService::new(user_repository, password_hasher));

    create_initial_admin_user(user_service.as_ref()).await?;

    Ok(AppState::new(user_service, token_service))
}

/// Build the token service from configuration
///
/// A missing signing secret is a startup error: generating one on the fly
/// would invalidate outstanding tokens on every restart and break verifiers
/// that share the secret.
fn create_token_service(config: &AppConfig) -> anyhow::Result<Arc<dyn TokenIssuer>> {
    let secret = config.auth.jwt_secret.clone().ok_or_else(|| {
        anyhow::anyhow!(
            "No signing secret configured. Set APP__AUTH__JWT_SECRET or auth.jwt_secret \
             in config/local.toml."
        )
    })?;

    let token_config = TokenConfig::new(secret)
        .with_issuer(config.auth.jwt_issuer.clone())
        .with_ttl_minutes(config.auth.token_ttl_minutes);

    Ok(Arc::new(TokenService::new(token_config)))
}

/// Generate a random password for the initial admin user
fn generate_random_password() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// Create an initial admin user if no users exist
async fn create_initial_admin_user(user_service: &dyn UserServiceTrait) -> anyhow::Result<()> {
    if user_service.count(None).await? > 0 {
        return Ok(());
    }

    // Use ADMIN_DEFAULT_PASSWORD env var if set, otherwise generate one
    let (password, is_default) = match std::env::var("ADMIN_DEFAULT_PASSWORD") {
        Ok(p) if !p.is_empty() => (p, true),
        _ => (generate_random_password(), false),
    };

    let request = CreateUserRequest {
        id: "admin".to_string(),
        username: "admin".to_string(),
        password: password.clone(),
    };

    user_service.create(request).await?;

    info!("===========================================");
    info!("Initial admin user created!");
    info!("Username: admin");

    if is_default {
        info!("Password: (set via ADMIN_DEFAULT_PASSWORD)");
    } else {
        info!("Password: {}", password);
    }

    info!("Please change this password after first login.");
    info!("===========================================");

    Ok(())
}
