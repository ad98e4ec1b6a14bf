//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository, UserStatus};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
    /// Index for username -> user ID lookup
    username_index: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            username_index: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let mut users_map = HashMap::new();
        let mut username_map = HashMap::new();

        for user in users {
            let id = user.id().as_str().to_string();
            username_map.insert(user.username().to_string(), id.clone());
            users_map.insert(id, user);
        }

        Self {
            users: Arc::new(RwLock::new(users_map)),
            username_index: Arc::new(RwLock::new(username_map)),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(id.as_str()).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let username_index = self.username_index.read().await;

        if let Some(user_id) = username_index.get(username) {
            let users = self.users.read().await;
            return Ok(users.get(user_id).cloned());
        }

        Ok(None)
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut username_index = self.username_index.write().await;

        let id = user.id().as_str().to_string();
        let username = user.username().to_string();

        if users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        if username_index.contains_key(&username) {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        username_index.insert(username, id.clone());
        users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut username_index = self.username_index.write().await;

        let id = user.id().as_str().to_string();

        let old_user = users
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        let old_username = old_user.username().to_string();
        let new_username = user.username().to_string();

        if old_username != new_username {
            if username_index.contains_key(&new_username) {
                return Err(DomainError::conflict(format!(
                    "Username '{}' already exists",
                    new_username
                )));
            }

            username_index.remove(&old_username);
            username_index.insert(new_username, id.clone());
        }

        users.insert(id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut users = self.users.write().await;
        let mut username_index = self.username_index.write().await;

        if let Some(user) = users.remove(id.as_str()) {
            username_index.remove(user.username());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| status.is_none_or(|s| u.status() == s))
            .cloned()
            .collect();

        result.sort_by(|a, b| a.id().as_str().cmp(b.id().as_str()));

        Ok(result)
    }

    async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError> {
        let users = self.users.read().await;

        Ok(users
            .values()
            .filter(|u| status.is_none_or(|s| u.status() == s))
            .count())
    }

    async fn record_login(&self, id: &UserId) -> Result<(), DomainError> {
        let mut users = self.users.write().await;

        if let Some(user) = users.get_mut(id.as_str()) {
            user.record_login();
            Ok(())
        } else {
            Err(DomainError::not_found(format!("User '{}' not found", id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user(id: &str, username: &str) -> User {
        User::new(UserId::new(id).unwrap(), username, "hashed_password")
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1", "alice");

        repo.create(user.clone()).await.unwrap();

        let by_id = repo.get(user.id()).await.unwrap().unwrap();
        assert_eq!(by_id.username(), "alice");

        let by_username = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_username.id().as_str(), "user-1");
    }

    #[tokio::test]
    async fn test_unknown_username_is_none() {
        let repo = InMemoryUserRepository::new();

        let result = repo.get_by_username("ghost").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = InMemoryUserRepository::new();

        repo.create(create_test_user("user-1", "alice"))
            .await
            .unwrap();

        let result = repo.create(create_test_user("user-1", "bob")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = InMemoryUserRepository::new();

        repo.create(create_test_user("user-1", "alice"))
            .await
            .unwrap();

        let result = repo.create(create_test_user("user-2", "alice")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_delete_clears_username_index() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1", "alice");

        repo.create(user.clone()).await.unwrap();
        assert!(repo.delete(user.id()).await.unwrap());

        assert!(repo.get_by_username("alice").await.unwrap().is_none());

        // Username can be reused afterwards
        repo.create(create_test_user("user-2", "alice"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_and_count_by_status() {
        let repo = InMemoryUserRepository::new();

        let mut suspended = create_test_user("user-1", "alice");
        suspended.suspend();

        repo.create(suspended).await.unwrap();
        repo.create(create_test_user("user-2", "bob")).await.unwrap();

        assert_eq!(repo.count(None).await.unwrap(), 2);
        assert_eq!(repo.count(Some(UserStatus::Active)).await.unwrap(), 1);

        let active = repo.list(Some(UserStatus::Active)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].username(), "bob");
    }

    #[tokio::test]
    async fn test_seeded_repository() {
        let repo = InMemoryUserRepository::with_users(vec![
            create_test_user("user-1", "alice"),
            create_test_user("user-2", "bob"),
        ]);

        assert_eq!(repo.count(None).await.unwrap(), 2);
        assert!(repo.get_by_username("bob").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_record_login_for_missing_user() {
        let repo = InMemoryUserRepository::new();
        let id = UserId::new("ghost").unwrap();

        let result = repo.record_login(&id).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
