//! Authentication middleware for Axum
//!
//! Validates the provider's Bearer token and puts the principal into the
//! request extensions as [`AuthContext`], where handlers pick it up with
//! `Extension<AuthContext>`.
//!
//! # Example
//!
//! ```no_run
//! use axum::{middleware, routing::get, Extension, Router};
//! use suppy_shared::auth::middleware::{create_jwt_middleware, AuthContext};
//!
//! async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
//!     format!("Hello, {}!", auth.user_id)
//! }
//!
//! let app: Router = Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(middleware::from_fn(create_jwt_middleware(
//!         "provider-jwt-secret-of-at-least-32-bytes",
//!         "authenticated",
//!     )));
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};

/// Authenticated principal, added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Principal that owns every record the request touches
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Invalid authorization header format
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidAudience { .. } => {
                AuthError::InvalidToken("Invalid audience".to_string())
            }
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = if status == StatusCode::BAD_REQUEST {
            "bad_request"
        } else {
            "unauthorized"
        };
        let body = Json(json!({
            "error": code,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty Bearer token".to_string()));
    }

    Ok(token)
}

/// JWT authentication middleware
///
/// # Errors
///
/// - 401 if the header is missing or the token is invalid, expired or for
///   another audience
/// - 400 if the header is not a Bearer token
pub async fn jwt_auth_middleware(
    secret: Arc<str>,
    audience: Arc<str>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = bearer_token(auth_header)?;
    let claims = validate_token(token, &secret, &audience)?;

    debug!(user_id = %claims.sub, "Authenticated request");
    req.extensions_mut().insert(AuthContext::new(claims.sub));

    Ok(next.run(req).await)
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>>;

/// Creates a JWT authentication middleware closure for `middleware::from_fn`
pub fn create_jwt_middleware(
    secret: impl Into<String>,
    audience: impl Into<String>,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    let secret: Arc<str> = Arc::from(secret.into());
    let audience: Arc<str> = Arc::from(audience.into());

    move |req, next| {
        let secret = secret.clone();
        let audience = audience.clone();
        Box::pin(jwt_auth_middleware(secret, audience, req, next))
    }
}
