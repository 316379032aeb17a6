//! Task model and database operations
//!
//! A task is one piece of support work for a client. Tasks only store the
//! `client_id`; reads join the client's name and system for display.
//!
//! # Priority
//!
//! ```text
//! urgent (1) → in_progress (2) → pending (3) → done (4)
//! ```
//!
//! The store returns tasks newest first. Display order by priority is applied
//! afterwards with [`crate::views::ordering::sort_tasks_for_display`].
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE task_status AS ENUM ('urgent', 'in_progress', 'pending', 'done');
//!
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     user_id UUID NOT NULL,
//!     client_id UUID NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
//!     description TEXT NOT NULL,
//!     status task_status NOT NULL DEFAULT 'pending',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use suppy_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, user_id: Uuid, client_id: Uuid) -> Result<(), sqlx::Error> {
//! let task = Task::create(&pool, CreateTask {
//!     user_id,
//!     client_id,
//!     description: "<p>Impressora da cozinha não imprime</p>".to_string(),
//!     status: TaskStatus::Urgent,
//! }).await?;
//!
//! Task::update(&pool, user_id, task.id, UpdateTask {
//!     status: Some(TaskStatus::Done),
//!     ..Default::default()
//! }).await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::client::ClientSystem;

/// Projection shared by every read; expects the task as `t` and the client as `c`
const TASK_SELECT: &str = "t.id, t.user_id, t.client_id, t.description, t.status, \
     t.created_at, t.updated_at, c.name AS client_name, c.system AS client_system";

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Urgent,
    InProgress,
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Urgent => "urgent",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }

    /// Display rank, lower sorts first
    pub fn priority(&self) -> u8 {
        match self {
            TaskStatus::Urgent => 1,
            TaskStatus::InProgress => 2,
            TaskStatus::Pending => 3,
            TaskStatus::Done => 4,
        }
    }

    /// Returns true if no more work is expected
    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

/// Owning client's identity, joined in for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
    pub system: ClientSystem,
}

/// Support task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,

    /// Principal that owns the row
    pub user_id: Uuid,

    pub client_id: Uuid,

    /// Rich-text (HTML) body
    pub description: String,

    pub status: TaskStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Joined client, absent if the client row could not be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientSummary>,
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    user_id: Uuid,
    client_id: Uuid,
    description: String,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    client_name: Option<String>,
    client_system: Option<ClientSystem>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        let client = match (row.client_name, row.client_system) {
            (Some(name), Some(system)) => Some(ClientSummary {
                id: row.client_id,
                name,
                system,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            user_id: row.user_id,
            client_id: row.client_id,
            description: row.description,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            client,
        }
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub user_id: Uuid,
    pub client_id: Uuid,
    pub description: String,
    pub status: TaskStatus,
}

/// Partial update for a task
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// Reassigns the task; the new client must belong to the same principal
    pub client_id: Option<Uuid>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.client_id.is_none() && self.description.is_none() && self.status.is_none()
    }
}

impl Task {
    /// Lists the principal's tasks, newest first, with the client joined
    pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {}
            FROM tasks t
            LEFT JOIN clients c ON c.id = t.client_id
            WHERE t.user_id = $1
            ORDER BY t.created_at DESC
            "#,
            TASK_SELECT
        );

        let rows = sqlx::query_as::<_, TaskRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        debug!(%user_id, count = rows.len(), "Listed tasks");
        Ok(rows.into_iter().map(Task::from).collect())
    }

    /// Finds one of the principal's tasks by ID
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {}
            FROM tasks t
            LEFT JOIN clients c ON c.id = t.client_id
            WHERE t.id = $1 AND t.user_id = $2
            "#,
            TASK_SELECT
        );

        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Task::from))
    }

    /// Creates a task for one of the principal's clients
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` when `client_id` does not name a client
    /// owned by `user_id`; nothing is inserted in that case.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            WITH t AS (
                INSERT INTO tasks (user_id, client_id, description, status)
                SELECT $1, owned.id, $3, $4
                FROM clients owned
                WHERE owned.id = $2 AND owned.user_id = $1
                RETURNING *
            )
            SELECT {}
            FROM t
            LEFT JOIN clients c ON c.id = t.client_id
            "#,
            TASK_SELECT
        );

        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(data.user_id)
            .bind(data.client_id)
            .bind(&data.description)
            .bind(data.status)
            .fetch_optional(pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        debug!(task_id = %row.id, client_id = %row.client_id, status = row.status.as_str(), "Created task");
        Ok(row.into())
    }

    /// Applies a partial update to one of the principal's tasks
    ///
    /// `updated_at` is bumped whenever at least one field is written.
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` if the task does not exist, or if
    /// `client_id` names a client the principal does not own.
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Self, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, user_id, id)
                .await?
                .ok_or(sqlx::Error::RowNotFound);
        }

        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut guard = String::new();
        let mut bind_count = 2;

        if data.client_id.is_some() {
            bind_count += 1;
            sets.push(format!("client_id = ${}", bind_count));
            guard = format!(
                " AND EXISTS (SELECT 1 FROM clients owned WHERE owned.id = ${} AND owned.user_id = $2)",
                bind_count
            );
        }
        if data.description.is_some() {
            bind_count += 1;
            sets.push(format!("description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            sets.push(format!("status = ${}", bind_count));
        }

        let query = format!(
            r#"
            WITH t AS (
                UPDATE tasks SET {}
                WHERE id = $1 AND user_id = $2{}
                RETURNING *
            )
            SELECT {}
            FROM t
            LEFT JOIN clients c ON c.id = t.client_id
            "#,
            sets.join(", "),
            guard,
            TASK_SELECT
        );

        let mut q = sqlx::query_as::<_, TaskRow>(&query).bind(id).bind(user_id);

        if let Some(client_id) = data.client_id {
            q = q.bind(client_id);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let row = q.fetch_optional(pool).await?.ok_or(sqlx::Error::RowNotFound)?;

        debug!(task_id = %id, status = row.status.as_str(), "Updated task");
        Ok(row.into())
    }

    /// Deletes one of the principal's tasks
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` if nothing was deleted.
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        debug!(task_id = %id, "Deleted task");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_priority() {
        assert_eq!(TaskStatus::Urgent.priority(), 1);
        assert_eq!(TaskStatus::InProgress.priority(), 2);
        assert_eq!(TaskStatus::Pending.priority(), 3);
        assert_eq!(TaskStatus::Done.priority(), 4);
        assert!(TaskStatus::Done.is_done());
        assert!(!TaskStatus::Urgent.is_done());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let status: TaskStatus = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(status, TaskStatus::Urgent);
        assert!(serde_json::from_str::<TaskStatus>("\"blocked\"").is_err());
    }

    #[test]
    fn test_row_with_client_join() {
        let client_id = Uuid::new_v4();
        let row = TaskRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            client_id,
            description: "<p>Trocar bobina</p>".to_string(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            client_name: Some("Padaria Central".to_string()),
            client_system: Some(ClientSystem::Cplug),
        };

        let task = Task::from(row);
        let client = task.client.unwrap();
        assert_eq!(client.id, client_id);
        assert_eq!(client.name, "Padaria Central");
        assert_eq!(client.system, ClientSystem::Cplug);
    }

    #[test]
    fn test_row_without_client_join() {
        let row = TaskRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            description: String::new(),
            status: TaskStatus::Done,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            client_name: None,
            client_system: None,
        };

        let task = Task::from(row);
        assert!(task.client.is_none());

        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("client").is_none());
    }

    #[test]
    fn test_create_task_requires_user_id() {
        let payload = serde_json::json!({
            "client_id": Uuid::new_v4(),
            "description": "x",
            "status": "pending"
        });
        assert!(serde_json::from_value::<CreateTask>(payload).is_err());
    }
}
