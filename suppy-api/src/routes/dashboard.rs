//! Dashboard endpoint
//!
//! ```text
//! GET /v1/dashboard
//! ```
//!
//! Returns the 5 newest clients (passwords masked), the 5 newest tasks and
//! the first 3 notes in favorite-first order.

use axum::{extract::State, Extension, Json};
use suppy_shared::auth::middleware::AuthContext;
use suppy_shared::views::dashboard::DashboardSummary;

use crate::{app::AppState, error::ApiResult};

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DashboardSummary>> {
    let summary = DashboardSummary::load(&state.db, auth.user_id).await?;
    Ok(Json(summary))
}
