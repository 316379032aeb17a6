//! # Suppy Shared Library
//!
//! Types, storage and view logic used by the Suppy API server.
//!
//! ## Module Organization
//!
//! - `crypto`: credential cipher for stored client passwords
//! - `models`: clients, tasks and notes with their database operations
//! - `views`: display ordering, search filters, note board and dashboard
//! - `auth`: JWT verification and the request principal
//! - `db`: connection pool and migrations

pub mod auth;
pub mod crypto;
pub mod db;
pub mod models;
pub mod views;

/// Current version of the Suppy shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
