//! Authentication infrastructure module
//!
//! Signed bearer token issuance and validation.

mod jwt;

pub use jwt::{TokenClaims, TokenConfig, TokenError, TokenIssuer, TokenService};
