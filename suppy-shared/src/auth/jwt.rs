//! JWT verification for provider-issued access tokens
//!
//! Sign-in happens at the hosted auth provider, which hands the dashboard an
//! HS256 access token signed with the project's JWT secret. This module
//! verifies those tokens and exposes the principal (`sub`) that scopes every
//! record.
//!
//! # Validation
//!
//! - **Algorithm**: HS256 only
//! - **Expiration**: `exp` is required and checked
//! - **Audience**: must match the configured audience (`authenticated` by default)
//!
//! Token creation is kept for tests and local tooling; production tokens
//! always come from the provider.
//!
//! # Example
//!
//! ```
//! use suppy_shared::auth::jwt::{create_token, validate_token, Claims};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = "a-provider-jwt-secret-of-32-bytes!";
//! let user_id = Uuid::new_v4();
//!
//! let token = create_token(&Claims::new(user_id, "authenticated"), secret)?;
//! let claims = validate_token(&token, secret, "authenticated")?;
//! assert_eq!(claims.sub, user_id);
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default audience of provider access tokens
pub const DEFAULT_AUDIENCE: &str = "authenticated";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Audience did not match
    #[error("Invalid audience: expected {expected}")]
    InvalidAudience { expected: String },
}

/// Access token claims
///
/// Only `sub`, `aud` and `exp` matter for authorization; the rest is carried
/// through for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - principal ID
    pub sub: Uuid,

    /// Audience
    pub aud: String,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Provider role, usually "authenticated"
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// Claims valid for one hour, the provider's default session length
    pub fn new(user_id: Uuid, audience: &str) -> Self {
        Self::with_expiration(user_id, audience, Duration::hours(1))
    }

    pub fn with_expiration(user_id: Uuid, audience: &str, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            aud: audience.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            role: Some(DEFAULT_AUDIENCE.to_string()),
            email: None,
        }
    }
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates an access token and returns its claims
///
/// # Arguments
///
/// * `token` - JWT from the `Authorization` header
/// * `secret` - provider JWT secret
/// * `audience` - expected `aud` claim
///
/// # Errors
///
/// - `JwtError::Expired` if `exp` has passed
/// - `JwtError::InvalidAudience` if `aud` does not match
/// - `JwtError::ValidationError` for bad signatures, wrong algorithm or
///   malformed tokens
pub fn validate_token(token: &str, secret: &str, audience: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);
    validation.set_required_spec_claims(&["exp", "aud", "sub"]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidAudience => JwtError::InvalidAudience {
            expected: audience.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
