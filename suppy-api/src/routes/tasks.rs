//! Task endpoints
//!
//! # Endpoints
//!
//! - `GET /v1/tasks?search=` - list in display order (priority, then newest)
//! - `POST /v1/tasks` - create
//! - `GET /v1/tasks/:id` - fetch one
//! - `PUT /v1/tasks/:id` - partial update
//! - `DELETE /v1/tasks/:id` - delete
//!
//! `search` matches the joined client name.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use suppy_shared::auth::middleware::AuthContext;
use suppy_shared::models::client::Client;
use suppy_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
use suppy_shared::views::ordering::sort_tasks_for_display;
use suppy_shared::views::search::{filter_tasks, SearchQuery};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::SearchParams;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

fn default_status() -> TaskStatus {
    TaskStatus::Pending
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(required(message = "Client is required"))]
    pub client_id: Option<Uuid>,

    /// Rich text (HTML)
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default = "default_status")]
    pub status: TaskStatus,
}

/// Update task request; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub client_id: Option<Uuid>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

fn client_not_found() -> ApiError {
    ApiError::invalid("client_id", "Client not found")
}

/// List tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Task>>> {
    let mut tasks = Task::list(&state.db, auth.user_id).await?;

    if let Some(search) = params.search.as_deref() {
        filter_tasks(&mut tasks, &SearchQuery::new(search));
    }
    sort_tasks_for_display(&mut tasks);

    Ok(Json(tasks))
}

/// Get one task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Create a task
///
/// # Errors
///
/// - `422 Unprocessable Entity`: missing client or description, or a client
///   the principal does not own
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;
    let client_id = req.client_id.ok_or_else(client_not_found)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: auth.user_id,
            client_id,
            description: req.description,
            status: req.status,
        },
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::RowNotFound => client_not_found(),
        other => other.into(),
    })?;

    info!(task_id = %task.id, status = task.status.as_str(), "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// Update a task
///
/// # Errors
///
/// - `404 Not Found`: no such task for this principal
/// - `422 Unprocessable Entity`: empty description or unknown client
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    if req.description.as_deref() == Some("") {
        return Err(ApiError::invalid("description", "Description is required"));
    }

    if let Some(client_id) = req.client_id {
        Client::find_by_id(&state.db, auth.user_id, client_id)
            .await?
            .ok_or_else(client_not_found)?;
    }

    let task = Task::update(
        &state.db,
        auth.user_id,
        id,
        UpdateTask {
            client_id: req.client_id,
            description: req.description,
            status: req.status,
        },
    )
    .await?;

    info!(task_id = %id, status = task.status.as_str(), "Task updated");
    Ok(Json(task))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    Task::delete(&state.db, auth.user_id, id).await?;

    info!(task_id = %id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
