//! Home page summary
//!
//! The dashboard shows a short slice of each list: the most recent clients
//! and tasks, and the top of the note list (favorites first). Client
//! passwords are never revealed here.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::clients::ClientView;
use crate::models::client::Client;
use crate::models::note::Note;
use crate::models::task::Task;

pub const RECENT_CLIENTS: usize = 5;
pub const RECENT_TASKS: usize = 5;
pub const TOP_NOTES: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// Newest clients, passwords masked
    pub clients: Vec<ClientView>,

    /// Newest tasks, in creation order (not priority order)
    pub tasks: Vec<Task>,

    /// First notes in favorite-first order
    pub notes: Vec<Note>,
}

impl DashboardSummary {
    /// Builds the summary from full lists in store order
    pub fn from_lists(clients: Vec<Client>, tasks: Vec<Task>, notes: Vec<Note>) -> Self {
        Self {
            clients: clients
                .into_iter()
                .take(RECENT_CLIENTS)
                .map(ClientView::masked)
                .collect(),
            tasks: tasks.into_iter().take(RECENT_TASKS).collect(),
            notes: notes.into_iter().take(TOP_NOTES).collect(),
        }
    }

    /// Loads the three lists for a principal and summarizes them
    pub async fn load(pool: &PgPool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let (clients, tasks, notes) = tokio::try_join!(
            Client::list(pool, user_id),
            Task::list(pool, user_id),
            Note::list(pool, user_id),
        )?;

        Ok(Self::from_lists(clients, tasks, notes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::client::{ClientStatus, SystemAccess};
    use crate::models::task::TaskStatus;
    use chrono::{Duration, Utc};

    fn clients(n: usize) -> Vec<Client> {
        (0..n)
            .map(|i| Client {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                name: format!("Cliente {}", i),
                access: SystemAccess::Winfood { operator: None },
                status: ClientStatus::Active,
                encrypted_password: Some("ciphertext".to_string()),
                cnpj: None,
                contact_info: vec![],
                integrations: vec![],
                created_at: Utc::now(),
            })
            .collect()
    }

    fn tasks(statuses: &[TaskStatus]) -> Vec<Task> {
        let t0 = Utc::now();
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Task {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                client_id: Uuid::nil(),
                description: String::new(),
                status: *status,
                created_at: t0 - Duration::minutes(i as i64),
                updated_at: t0,
                client: None,
            })
            .collect()
    }

    fn notes(n: usize) -> Vec<Note> {
        (0..n)
            .map(|i| Note {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                title: format!("Nota {}", i),
                content: String::new(),
                is_favorite: i == 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_summary_truncates_lists() {
        let statuses = vec![TaskStatus::Done; 8];
        let summary = DashboardSummary::from_lists(clients(7), tasks(&statuses), notes(6));

        assert_eq!(summary.clients.len(), RECENT_CLIENTS);
        assert_eq!(summary.tasks.len(), RECENT_TASKS);
        assert_eq!(summary.notes.len(), TOP_NOTES);
        assert_eq!(summary.clients[0].client.name, "Cliente 0");
        assert_eq!(summary.notes[0].title, "Nota 0");
    }

    #[test]
    fn test_summary_masks_passwords() {
        let summary = DashboardSummary::from_lists(clients(1), vec![], vec![]);
        assert_eq!(summary.clients[0].password.as_deref(), Some("******"));
    }

    #[test]
    fn test_summary_keeps_task_store_order() {
        let input = tasks(&[TaskStatus::Done, TaskStatus::Urgent]);
        let first = input[0].id;

        let summary = DashboardSummary::from_lists(vec![], input, vec![]);
        assert_eq!(summary.tasks[0].id, first);
    }

    #[test]
    fn test_summary_of_empty_lists() {
        let summary = DashboardSummary::from_lists(vec![], vec![], vec![]);
        assert!(summary.clients.is_empty());
        assert!(summary.tasks.is_empty());
        assert!(summary.notes.is_empty());
    }
}
