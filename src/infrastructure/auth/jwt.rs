//! Signed bearer token issuance and validation
//!
//! Tokens are standard compact JWS strings (three dot-separated base64url
//! segments) signed with HMAC-SHA-256, so any third party holding the shared
//! secret can verify them independently.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;
use thiserror::Error;

use crate::domain::DomainError;

/// Scheme prefix callers may leave on a token taken from an Authorization header
const BEARER_PREFIX: &str = "Bearer ";

/// Reasons a token fails validation
///
/// Validation failures are values, not exceptions; callers decide how to
/// report them. The external contract may collapse everything but `Missing`
/// to a plain "invalid".
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token missing")]
    Missing,

    #[error("Token is malformed")]
    Malformed,

    #[error("Token has expired")]
    Expired,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token issuer is not recognized")]
    WrongIssuer,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::WrongIssuer,
            _ => Self::Malformed,
        }
    }
}

/// Claims embedded in an issued token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
    /// Caller-supplied claims merged into the payload
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// Create claims for a subject expiring `ttl` from now
    pub fn new(subject: impl Into<String>, issuer: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.into(),
            iss: issuer.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            extra: Map::new(),
        }
    }

    /// Get the subject claim
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Check if the claims are past their expiry
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared secret for signing and verification
    pub secret: String,
    /// Issuer claim stamped on every token and checked on validation
    pub issuer: String,
    /// Default token lifetime in minutes, used by every call path that
    /// does not pass an explicit TTL
    pub ttl_minutes: i64,
}

impl TokenConfig {
    /// Default issuer claim
    pub const DEFAULT_ISSUER: &'static str = "token-issuer";

    /// Default token lifetime in minutes
    pub const DEFAULT_TTL_MINUTES: i64 = 60;

    /// Create a configuration with the default issuer and lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: Self::DEFAULT_ISSUER.to_string(),
            ttl_minutes: Self::DEFAULT_TTL_MINUTES,
        }
    }

    /// Override the issuer claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Override the default token lifetime
    pub fn with_ttl_minutes(mut self, minutes: i64) -> Self {
        self.ttl_minutes = minutes;
        self
    }
}

/// Trait for token operations
pub trait TokenIssuer: Send + Sync + Debug {
    /// Issue a token for `subject` with the service default lifetime
    fn issue(&self, subject: &str) -> Result<String, DomainError>;

    /// Issue a token for `subject` with an explicit lifetime
    fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String, DomainError>;

    /// Issue a token carrying additional caller-supplied claims
    fn issue_with_claims(
        &self,
        subject: &str,
        extra: Map<String, Value>,
        ttl: Option<Duration>,
    ) -> Result<String, DomainError>;

    /// Validate a token and return its claims
    ///
    /// Accepts the raw token with or without a leading `Bearer ` prefix.
    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError>;

    /// Default token lifetime in minutes
    fn ttl_minutes(&self) -> i64;
}

/// Token service signing with a process-wide symmetric secret
#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.config.issuer)
            .field("ttl_minutes", &self.config.ttl_minutes)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl TokenService {
    /// Create a new token service from configuration
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // No grace period: exp <= now is rejected
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    fn encode_claims(&self, claims: &TokenClaims) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign token: {}", e)))
    }

    fn default_ttl(&self) -> Duration {
        Duration::minutes(self.config.ttl_minutes)
    }
}

impl TokenIssuer for TokenService {
    fn issue(&self, subject: &str) -> Result<String, DomainError> {
        self.issue_with_ttl(subject, self.default_ttl())
    }

    fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String, DomainError> {
        let claims = TokenClaims::new(subject, &self.config.issuer, ttl);
        self.encode_claims(&claims)
    }

    fn issue_with_claims(
        &self,
        subject: &str,
        extra: Map<String, Value>,
        ttl: Option<Duration>,
    ) -> Result<String, DomainError> {
        let mut claims = TokenClaims::new(
            subject,
            &self.config.issuer,
            ttl.unwrap_or_else(|| self.default_ttl()),
        );
        claims.extra = extra;
        self.encode_claims(&claims)
    }

    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let token = token.strip_prefix(BEARER_PREFIX).unwrap_or(token).trim();

        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(token_data.claims)
    }

    fn ttl_minutes(&self) -> i64 {
        self.config.ttl_minutes
    }
}
