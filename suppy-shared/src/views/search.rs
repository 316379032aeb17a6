//! Free-text search over listed records
//!
//! Matching is a case-insensitive substring test. A blank query keeps every
//! record.
//!
//! | record | fields searched                 |
//! |--------|---------------------------------|
//! | client | name, system login              |
//! | task   | joined client name              |
//! | note   | title, content (raw rich text)  |

use crate::models::client::Client;
use crate::models::note::Note;
use crate::models::task::Task;

/// Normalized search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    fn hit(&self, field: Option<&str>) -> bool {
        field.is_some_and(|value| value.to_lowercase().contains(&self.0))
    }

    pub fn matches_client(&self, client: &Client) -> bool {
        self.is_blank()
            || self.hit(Some(&client.name))
            || self.hit(client.access.system_login())
    }

    pub fn matches_task(&self, task: &Task) -> bool {
        self.is_blank() || self.hit(task.client.as_ref().map(|c| c.name.as_str()))
    }

    pub fn matches_note(&self, note: &Note) -> bool {
        self.is_blank() || self.hit(Some(&note.title)) || self.hit(Some(&note.content))
    }
}

pub fn filter_clients(clients: &mut Vec<Client>, query: &SearchQuery) {
    clients.retain(|c| query.matches_client(c));
}

pub fn filter_tasks(tasks: &mut Vec<Task>, query: &SearchQuery) {
    tasks.retain(|t| query.matches_task(t));
}

pub fn filter_notes(notes: &mut Vec<Note>, query: &SearchQuery) {
    notes.retain(|n| query.matches_note(n));
}
