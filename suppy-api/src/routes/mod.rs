//! API route handlers
//!
//! - `health`: health check (public)
//! - `clients`, `tasks`, `notes`: record endpoints
//! - `dashboard`: home page summary
//!
//! Every `/v1` handler receives the principal as `Extension<AuthContext>` and
//! passes it to the model explicitly.

use serde::Deserialize;
use validator::ValidationError;

use crate::error::ApiError;

pub mod clients;
pub mod dashboard;
pub mod health;
pub mod notes;
pub mod tasks;

/// `?search=` on list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: Option<String>,
}

/// Rejects empty and whitespace-only strings
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Same check for optional fields of partial updates
pub(crate) fn check_not_blank(field: &str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(ApiError::invalid(field, &format!("{} must not be blank", field)))
        }
        _ => Ok(()),
    }
}
