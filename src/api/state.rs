//! Application state for shared services

use std::sync::Arc;

use crate::domain::user::{UserRepository, UserStatus};
use crate::domain::{DomainError, User};
use crate::infrastructure::auth::TokenIssuer;
use crate::infrastructure::user::{
    CreateUserRequest, PasswordHasher, UpdatePasswordRequest, UserService,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub token_service: Arc<dyn TokenIssuer>,
}

impl AppState {
    pub fn new(
        user_service: Arc<dyn UserServiceTrait>,
        token_service: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            user_service,
            token_service,
        }
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError>;
    async fn get(&self, id: &str) -> Result<Option<User>, DomainError>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError>;
    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError>;
    async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError>;
    async fn update_password(
        &self,
        id: &str,
        request: UpdatePasswordRequest,
    ) -> Result<User, DomainError>;
    async fn suspend(&self, id: &str) -> Result<User, DomainError>;
    async fn activate(&self, id: &str) -> Result<User, DomainError>;
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
}

#[async_trait::async_trait]
impl<R: UserRepository + 'static, H: PasswordHasher + 'static> UserServiceTrait
    for UserService<R, H>
{
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        UserService::authenticate(self, username, password).await
    }

    async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        UserService::get_by_username(self, username).await
    }

    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        UserService::create(self, request).await
    }

    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError> {
        UserService::list(self, status).await
    }

    async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError> {
        UserService::count(self, status).await
    }

    async fn update_password(
        &self,
        id: &str,
        request: UpdatePasswordRequest,
    ) -> Result<User, DomainError> {
        UserService::update_password(self, id, request).await
    }

    async fn suspend(&self, id: &str) -> Result<User, DomainError> {
        UserService::suspend(self, id).await
    }

    async fn activate(&self, id: &str) -> Result<User, DomainError> {
        UserService::activate(self, id).await
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        UserService::delete(self, id).await
    }
}
