//! User infrastructure module
//!
//! Implementations for credential verification and user management: password
//! hashing with Argon2, the in-memory repository, and the user service.

mod password;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use repository::InMemoryUserRepository;
pub use service::{CreateUserRequest, UpdatePasswordRequest, UserService};
