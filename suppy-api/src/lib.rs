//! # Suppy API Server Library
//!
//! HTTP JSON API for the support dashboard: clients, tasks, notes and the
//! dashboard summary, all scoped to the authenticated principal.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration from environment variables
//! - `error`: error handling and HTTP response mapping
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
