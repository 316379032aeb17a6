//! In-memory note list with an optimistic favorite toggle
//!
//! [`NoteBoard`] keeps one principal's notes in favorite-first order. When a
//! favorite is toggled the local list is updated and re-sorted right away,
//! before the store has answered:
//!
//! ```text
//! toggle ─► flip flag locally ─► re-sort ─► store.set_favorite
//!                                              │
//!                         ok ◄─────────────────┴────────────► err
//!                          │                                   │
//!               adopt returned row                  re-fetch full list
//! ```
//!
//! # Example
//!
//! ```no_run
//! use suppy_shared::views::notes::NoteBoard;
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, user_id: Uuid, note_id: Uuid) -> Result<(), sqlx::Error> {
//! let mut board = NoteBoard::load(pool, user_id).await?;
//! board.toggle_favorite(note_id).await?;
//!
//! for note in board.notes() {
//!     println!("{} {}", if note.is_favorite { "★" } else { " " }, note.title);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use super::ordering::sort_notes;
use crate::models::note::Note;

/// Remote side of the note board
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Authoritative list, favorite first then newest updated
    async fn list_notes(&self, user_id: Uuid) -> Result<Vec<Note>, sqlx::Error>;

    /// Persists the favorite flag and returns the stored row
    async fn set_favorite(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_favorite: bool,
    ) -> Result<Note, sqlx::Error>;
}

#[async_trait]
impl NoteStore for PgPool {
    async fn list_notes(&self, user_id: Uuid) -> Result<Vec<Note>, sqlx::Error> {
        Note::list(self, user_id).await
    }

    async fn set_favorite(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_favorite: bool,
    ) -> Result<Note, sqlx::Error> {
        Note::set_favorite(self, user_id, id, is_favorite).await
    }
}

/// One principal's notes, kept in display order
pub struct NoteBoard<S> {
    store: S,
    user_id: Uuid,
    notes: Vec<Note>,
}

impl<S: NoteStore> NoteBoard<S> {
    /// Fetches the principal's notes
    pub async fn load(store: S, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let notes = store.list_notes(user_id).await?;
        Ok(Self {
            store,
            user_id,
            notes,
        })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Replaces the local list with the store's
    pub async fn refresh(&mut self) -> Result<(), sqlx::Error> {
        self.notes = self.store.list_notes(self.user_id).await?;
        Ok(())
    }

    /// Inserts or replaces a note locally (e.g. after a create or edit)
    pub fn upsert(&mut self, note: Note) {
        match self.notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note,
            None => self.notes.push(note),
        }
        sort_notes(&mut self.notes);
    }

    /// Drops a note locally; returns false if it was not on the board
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        self.notes.len() != before
    }

    /// Sets the flag locally and re-sorts, without touching the store
    ///
    /// Returns false if the note is not on the board.
    pub fn apply_favorite(&mut self, id: Uuid, is_favorite: bool) -> bool {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return false;
        };

        note.is_favorite = is_favorite;
        sort_notes(&mut self.notes);
        true
    }

    /// Flips a note's favorite flag optimistically and persists it
    ///
    /// Returns the new flag value.
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` if the note is not on the board. If the
    /// store rejects the change the board re-fetches the list and the store's
    /// error is returned; if that re-fetch fails too, the local flip is undone.
    pub async fn toggle_favorite(&mut self, id: Uuid) -> Result<bool, sqlx::Error> {
        let current = self
            .notes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.is_favorite)
            .ok_or(sqlx::Error::RowNotFound)?;
        let next = !current;

        self.apply_favorite(id, next);

        match self.store.set_favorite(self.user_id, id, next).await {
            Ok(stored) => {
                debug!(note_id = %id, is_favorite = stored.is_favorite, "Favorite saved");
                self.upsert(stored);
                Ok(next)
            }
            Err(e) => {
                warn!(note_id = %id, error = %e, "Failed to save favorite, re-fetching notes");
                if let Err(refresh_err) = self.refresh().await {
                    warn!(error = %refresh_err, "Re-fetch failed, reverting favorite locally");
                    self.apply_favorite(id, current);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory store standing in for Postgres
    #[derive(Default)]
    struct FakeStore {
        notes: Mutex<Vec<Note>>,
        fail_writes: AtomicBool,
        fail_reads: AtomicBool,
        list_calls: AtomicUsize,
    }

    #[async_trait]
    impl NoteStore for FakeStore {
        async fn list_notes(&self, _user_id: Uuid) -> Result<Vec<Note>, sqlx::Error> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(sqlx::Error::PoolTimedOut);
            }
            let mut notes = self.notes.lock().unwrap().clone();
            sort_notes(&mut notes);
            Ok(notes)
        }

        async fn set_favorite(
            &self,
            _user_id: Uuid,
            id: Uuid,
            is_favorite: bool,
        ) -> Result<Note, sqlx::Error> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(sqlx::Error::PoolTimedOut);
            }
            let mut notes = self.notes.lock().unwrap();
            let note = notes
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or(sqlx::Error::RowNotFound)?;
            note.is_favorite = is_favorite;
            Ok(note.clone())
        }
    }

    fn note(title: &str, is_favorite: bool, updated_at: DateTime<Utc>) -> Note {
        Note {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: title.to_string(),
            content: String::new(),
            is_favorite,
            created_at: updated_at,
            updated_at,
        }
    }

    fn titles<S: NoteStore>(board: &NoteBoard<S>) -> Vec<String> {
        board.notes().iter().map(|n| n.title.clone()).collect()
    }

    async fn board_with(notes: Vec<Note>) -> NoteBoard<FakeStore> {
        let store = FakeStore {
            notes: Mutex::new(notes),
            ..Default::default()
        };
        NoteBoard::load(store, Uuid::nil()).await.unwrap()
    }

    fn sample() -> (Vec<Note>, Uuid) {
        let t0 = Utc::now();
        let a = note("A", false, t0 + Duration::seconds(1));
        let b = note("B", true, t0);
        let c = note("C", false, t0 + Duration::seconds(2));
        let a_id = a.id;
        (vec![a, b, c], a_id)
    }

    #[tokio::test]
    async fn test_load_sorts_notes() {
        let (notes, _) = sample();
        let board = board_with(notes).await;
        assert_eq!(titles(&board), vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_apply_favorite_repositions_immediately() {
        let (notes, a_id) = sample();
        let mut board = board_with(notes).await;

        assert!(board.apply_favorite(a_id, true));
        assert_eq!(titles(&board), vec!["A", "B", "C"]);
        assert_eq!(board.store.list_calls.load(Ordering::SeqCst), 1);

        assert!(!board.apply_favorite(Uuid::new_v4(), true));
    }

    #[tokio::test]
    async fn test_toggle_favorite_without_refetch() {
        let (notes, a_id) = sample();
        let mut board = board_with(notes).await;

        let now_favorite = board.toggle_favorite(a_id).await.unwrap();

        assert!(now_favorite);
        assert_eq!(titles(&board)[0], "A");
        assert!(board.notes()[0].is_favorite);
        // only the initial load hit the list endpoint
        assert_eq!(board.store.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_toggle_off_moves_behind_favorites() {
        let (notes, _) = sample();
        let mut board = board_with(notes).await;
        let b_id = board.notes()[0].id;

        assert!(!board.toggle_favorite(b_id).await.unwrap());
        assert_eq!(titles(&board), vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_failed_write_refetches() {
        let (notes, a_id) = sample();
        let mut board = board_with(notes).await;
        board.store.fail_writes.store(true, Ordering::SeqCst);

        let result = board.toggle_favorite(a_id).await;

        assert!(result.is_err());
        assert_eq!(board.store.list_calls.load(Ordering::SeqCst), 2);
        // store never saw the change, so the re-fetched list is the original
        assert_eq!(titles(&board), vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_failed_write_and_refetch_reverts() {
        let (notes, a_id) = sample();
        let mut board = board_with(notes).await;
        board.store.fail_writes.store(true, Ordering::SeqCst);
        board.store.fail_reads.store(true, Ordering::SeqCst);

        assert!(board.toggle_favorite(a_id).await.is_err());
        assert_eq!(titles(&board), vec!["B", "C", "A"]);
        assert!(board.notes().iter().all(|n| n.id != a_id || !n.is_favorite));
    }

    #[tokio::test]
    async fn test_toggle_unknown_note() {
        let (notes, _) = sample();
        let mut board = board_with(notes).await;

        let result = board.toggle_favorite(Uuid::new_v4()).await;
        assert!(matches!(result, Err(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn test_upsert_and_remove() {
        let (notes, a_id) = sample();
        let mut board = board_with(notes).await;

        let fresh = note("D", false, Utc::now() + Duration::minutes(1));
        board.upsert(fresh);
        assert_eq!(titles(&board), vec!["B", "D", "C", "A"]);

        assert!(board.remove(a_id));
        assert!(!board.remove(a_id));
        assert_eq!(board.notes().len(), 3);
    }
}
