//! Authentication utilities
//!
//! Sign-in is handled by the hosted auth provider. This module only checks
//! the provider's access tokens and turns them into a principal.
//!
//! # Modules
//!
//! - [`jwt`]: HS256 access token validation
//! - [`middleware`]: Axum middleware that attaches [`middleware::AuthContext`] to requests

pub mod jwt;
pub mod middleware;
