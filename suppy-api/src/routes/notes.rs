//! Note endpoints
//!
//! # Endpoints
//!
//! - `GET /v1/notes?search=` - list, favorites first then newest updated
//! - `POST /v1/notes` - create
//! - `GET /v1/notes/:id` - fetch one
//! - `PUT /v1/notes/:id` - partial update
//! - `DELETE /v1/notes/:id` - delete
//! - `POST /v1/notes/:id/favorite` - set the favorite flag
//!
//! The favorite endpoint returns the stored row; the front end keeps its own
//! list in order meanwhile and only re-fetches if the call fails.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use suppy_shared::auth::middleware::AuthContext;
use suppy_shared::models::note::{CreateNote, Note, UpdateNote};
use suppy_shared::views::search::{filter_notes, SearchQuery};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{check_not_blank, not_blank, SearchParams};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Create note request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,

    /// Rich text (HTML)
    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,

    #[serde(default)]
    pub is_favorite: bool,
}

/// Update note request; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_favorite: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub is_favorite: bool,
}

/// List notes
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Note>>> {
    let mut notes = Note::list(&state.db, auth.user_id).await?;

    if let Some(search) = params.search.as_deref() {
        filter_notes(&mut notes, &SearchQuery::new(search));
    }

    Ok(Json(notes))
}

/// Get one note
pub async fn get_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Note>> {
    let note = Note::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(note))
}

/// Create a note
///
/// # Errors
///
/// - `422 Unprocessable Entity`: blank title or content
pub async fn create_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    req.validate()?;

    let note = Note::create(
        &state.db,
        CreateNote {
            user_id: auth.user_id,
            title: req.title.trim().to_string(),
            content: req.content,
            is_favorite: req.is_favorite,
        },
    )
    .await?;

    info!(note_id = %note.id, "Note created");
    Ok((StatusCode::CREATED, Json(note)))
}

/// Update a note
///
/// # Errors
///
/// - `404 Not Found`: no such note for this principal
/// - `422 Unprocessable Entity`: blank title or content
pub async fn update_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNoteRequest>,
) -> ApiResult<Json<Note>> {
    check_not_blank("title", req.title.as_deref())?;
    check_not_blank("content", req.content.as_deref())?;

    let note = Note::update(
        &state.db,
        auth.user_id,
        id,
        UpdateNote {
            title: req.title.map(|t| t.trim().to_string()),
            content: req.content,
            is_favorite: req.is_favorite,
        },
    )
    .await?;

    info!(note_id = %id, "Note updated");
    Ok(Json(note))
}

/// Set a note's favorite flag
///
/// ```text
/// POST /v1/notes/:id/favorite
/// { "is_favorite": true }
/// ```
pub async fn set_favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<FavoriteRequest>,
) -> ApiResult<Json<Note>> {
    let note = Note::set_favorite(&state.db, auth.user_id, id, req.is_favorite).await?;

    info!(note_id = %id, is_favorite = note.is_favorite, "Note favorite set");
    Ok(Json(note))
}

/// Delete a note
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    Note::delete(&state.db, auth.user_id, id).await?;

    info!(note_id = %id, "Note deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_validation() {
        let ok: CreateNoteRequest = serde_json::from_value(json!({
            "title": "Backup",
            "content": "<p>Rodar às 23h</p>"
        }))
        .unwrap();
        assert!(ok.validate().is_ok());
        assert!(!ok.is_favorite);

        let blank: CreateNoteRequest = serde_json::from_value(json!({
            "title": " ",
            "content": ""
        }))
        .unwrap();
        let errors = blank.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }

    #[test]
    fn test_favorite_request_requires_flag() {
        assert!(serde_json::from_value::<FavoriteRequest>(json!({})).is_err());
        let req: FavoriteRequest = serde_json::from_value(json!({ "is_favorite": true })).unwrap();
        assert!(req.is_favorite);
    }
}
