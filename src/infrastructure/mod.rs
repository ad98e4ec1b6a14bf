//! Infrastructure layer - concrete service implementations

pub mod auth;
pub mod logging;
pub mod user;
