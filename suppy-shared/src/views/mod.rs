//! View state built on top of the models
//!
//! - `ordering`: display order for tasks (by priority) and notes
//! - `search`: case-insensitive filters for the list pages
//! - `clients`: clients with their password decrypted or masked
//! - `notes`: note board with the optimistic favorite toggle
//! - `dashboard`: home page summary

pub mod clients;
pub mod dashboard;
pub mod notes;
pub mod ordering;
pub mod search;
