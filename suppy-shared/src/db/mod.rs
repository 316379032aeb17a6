//! Database layer
//!
//! - `pool`: Postgres connection pool with health checks
//! - `migrations`: embedded schema migrations
//!
//! The record models themselves live in [`crate::models`].

pub mod migrations;
pub mod pool;
