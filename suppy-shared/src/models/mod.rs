//! Database models for Suppy
//!
//! Every model is scoped to an owning principal (`user_id`). Read, update
//! and delete calls take the principal explicitly. Create payloads carry it
//! as a required field, and the models never fill it in themselves.
//!
//! # Models
//!
//! - `client`: client accounts and their point-of-sale logins
//! - `integration`: third-party credentials embedded in a client
//! - `task`: support tasks, joined with their client for display
//! - `note`: knowledge-base notes with a favorite flag
//!
//! # Example
//!
//! ```no_run
//! use suppy_shared::models::note::{CreateNote, Note};
//! use suppy_shared::db::pool::{create_pool, DatabaseConfig};
//! use uuid::Uuid;
//!
//! # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let note = Note::create(&pool, CreateNote {
//!     user_id,
//!     title: "Reinstalar driver da impressora".to_string(),
//!     content: "<ol><li>Baixar o driver</li></ol>".to_string(),
//!     is_favorite: false,
//! }).await?;
//!
//! Note::set_favorite(&pool, user_id, note.id, true).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod integration;
pub mod note;
pub mod task;
