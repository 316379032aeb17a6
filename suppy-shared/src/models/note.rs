//! Note model and database operations
//!
//! Notes are the team's knowledge base: a title, a rich-text body and a
//! favorite flag. Lists come back favorite first, then most recently updated
//! first.
//!
//! Flipping `is_favorite` does not touch `updated_at`. Only title and content
//! edits count as an update, so a note keeps its place among the other
//! favorites (or non-favorites) when it is starred or unstarred.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE notes (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     user_id UUID NOT NULL,
//!     title TEXT NOT NULL,
//!     content TEXT NOT NULL DEFAULT '',
//!     is_favorite BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

const NOTE_COLUMNS: &str = "id, user_id, title, content, is_favorite, created_at, updated_at";

/// Knowledge-base note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: Uuid,

    /// Principal that owns the row
    pub user_id: Uuid,

    pub title: String,

    /// Rich-text (HTML) body
    pub content: String,

    pub is_favorite: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNote {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Partial update for a note
#[derive(Debug, Clone, Default)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_favorite: Option<bool>,
}

impl UpdateNote {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.is_favorite.is_none()
    }

    /// True if the edit changes the note's text
    fn touches_text(&self) -> bool {
        self.title.is_some() || self.content.is_some()
    }
}

impl Note {
    /// Lists the principal's notes, favorites first, then newest updated
    pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM notes WHERE user_id = $1 ORDER BY is_favorite DESC, updated_at DESC",
            NOTE_COLUMNS
        );

        let notes = sqlx::query_as::<_, Note>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        debug!(%user_id, count = notes.len(), "Listed notes");
        Ok(notes)
    }

    /// Finds one of the principal's notes by ID
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM notes WHERE id = $1 AND user_id = $2",
            NOTE_COLUMNS
        );

        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Creates a note
    pub async fn create(pool: &PgPool, data: CreateNote) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO notes (user_id, title, content, is_favorite)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            NOTE_COLUMNS
        );

        let note = sqlx::query_as::<_, Note>(&query)
            .bind(data.user_id)
            .bind(&data.title)
            .bind(&data.content)
            .bind(data.is_favorite)
            .fetch_one(pool)
            .await?;

        debug!(note_id = %note.id, "Created note");
        Ok(note)
    }

    /// Applies a partial update to one of the principal's notes
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` if the note does not exist.
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateNote,
    ) -> Result<Self, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, user_id, id)
                .await?
                .ok_or(sqlx::Error::RowNotFound);
        }

        let mut sets = Vec::new();
        let mut bind_count = 2;

        if data.touches_text() {
            sets.push("updated_at = NOW()".to_string());
        }
        if data.title.is_some() {
            bind_count += 1;
            sets.push(format!("title = ${}", bind_count));
        }
        if data.content.is_some() {
            bind_count += 1;
            sets.push(format!("content = ${}", bind_count));
        }
        if data.is_favorite.is_some() {
            bind_count += 1;
            sets.push(format!("is_favorite = ${}", bind_count));
        }

        let query = format!(
            "UPDATE notes SET {} WHERE id = $1 AND user_id = $2 RETURNING {}",
            sets.join(", "),
            NOTE_COLUMNS
        );

        let mut q = sqlx::query_as::<_, Note>(&query).bind(id).bind(user_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(content) = data.content {
            q = q.bind(content);
        }
        if let Some(is_favorite) = data.is_favorite {
            q = q.bind(is_favorite);
        }

        let note = q.fetch_optional(pool).await?.ok_or(sqlx::Error::RowNotFound)?;

        debug!(note_id = %id, "Updated note");
        Ok(note)
    }

    /// Sets the favorite flag
    pub async fn set_favorite(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        is_favorite: bool,
    ) -> Result<Self, sqlx::Error> {
        Self::update(
            pool,
            user_id,
            id,
            UpdateNote {
                is_favorite: Some(is_favorite),
                ..Default::default()
            },
        )
        .await
    }

    /// Deletes one of the principal's notes
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` if nothing was deleted.
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        debug!(note_id = %id, "Deleted note");
        Ok(())
    }
}
