//! Client endpoints
//!
//! # Endpoints
//!
//! - `GET /v1/clients?search=` - list, newest first, passwords decrypted
//! - `POST /v1/clients` - create
//! - `GET /v1/clients/:id` - fetch one
//! - `PUT /v1/clients/:id` - partial update
//! - `DELETE /v1/clients/:id` - delete (and its tasks)
//!
//! Passwords travel in clear over the API (`password`) and are encrypted
//! before they reach the store. On update an empty or missing `password`
//! leaves the stored one untouched.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use suppy_shared::auth::middleware::AuthContext;
use suppy_shared::models::client::{
    Client, ClientStatus, ClientSystem, ContactInfo, CreateClient, SystemAccess, UpdateClient,
};
use suppy_shared::models::integration::{validate_integrations, Integration};
use suppy_shared::views::clients::ClientView;
use suppy_shared::views::search::{filter_clients, SearchQuery};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{check_not_blank, not_blank, SearchParams};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

fn default_status() -> ClientStatus {
    ClientStatus::Implantation
}

/// Create client request
///
/// ```json
/// {
///   "name": "Pizzaria Bella",
///   "system": "cplug",
///   "login_code": "4821",
///   "username": "admin",
///   "password": "s3nha",
///   "status": "implantation",
///   "contact_info": [{ "type": "phone", "value": "+55 11 99999-0000" }],
///   "integrations": [{ "type": "ifood", "id": "7a1e", "username": "loja" }]
/// }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[serde(flatten)]
    pub access: SystemAccess,

    #[serde(default = "default_status")]
    pub status: ClientStatus,

    /// Plaintext; blank means no password
    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub cnpj: Option<String>,

    #[serde(default)]
    pub contact_info: Vec<ContactInfo>,

    #[serde(default)]
    pub integrations: Vec<Integration>,
}

/// Update client request; every field is optional
///
/// The login fields are replaced together with `system`, so changing any of
/// them requires `system` as well.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,

    pub system: Option<ClientSystem>,

    /// cplug only
    pub login_code: Option<String>,

    /// winfood only
    pub operator: Option<String>,

    /// cplug only
    pub username: Option<String>,

    pub status: Option<ClientStatus>,

    /// Plaintext; blank or absent keeps the stored password
    pub password: Option<String>,

    /// Empty string clears it
    pub cnpj: Option<String>,

    pub contact_info: Option<Vec<ContactInfo>>,

    pub integrations: Option<Vec<Integration>>,
}

impl UpdateClientRequest {
    /// Builds the replacement login from `system` and its fields
    ///
    /// # Errors
    ///
    /// Login fields without `system`, or fields the chosen system does not
    /// have.
    fn take_access(&mut self) -> ApiResult<Option<SystemAccess>> {
        let login_code = self.login_code.take();
        let operator = self.operator.take();
        let username = self.username.take();

        match self.system {
            None if login_code.is_some() || operator.is_some() || username.is_some() => Err(
                ApiError::invalid("system", "System is required to change login details"),
            ),
            None => Ok(None),
            Some(ClientSystem::Winfood) => {
                if login_code.is_some() || username.is_some() {
                    return Err(ApiError::invalid(
                        "system",
                        "Winfood logins only have an operator",
                    ));
                }
                Ok(Some(SystemAccess::Winfood { operator }))
            }
            Some(ClientSystem::Cplug) => {
                if operator.is_some() {
                    return Err(ApiError::invalid(
                        "system",
                        "Cplug logins have a login code and username, not an operator",
                    ));
                }
                Ok(Some(SystemAccess::Cplug {
                    login_code,
                    username,
                }))
            }
        }
    }
}

/// Encrypts a submitted password, treating blank as "not submitted"
fn encrypt_password(state: &AppState, password: Option<String>) -> ApiResult<Option<String>> {
    match password.filter(|p| !p.is_empty()) {
        Some(plaintext) => Ok(Some(state.cipher.encrypt(&plaintext)?)),
        None => Ok(None),
    }
}

fn check_integrations(integrations: &[Integration]) -> ApiResult<()> {
    validate_integrations(integrations).map_err(|msg| ApiError::invalid("integrations", &msg))
}

/// List clients
///
/// # Errors
///
/// - `401 Unauthorized`: missing or invalid JWT
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<ClientView>>> {
    let mut clients = Client::list(&state.db, auth.user_id).await?;

    if let Some(search) = params.search.as_deref() {
        filter_clients(&mut clients, &SearchQuery::new(search));
    }

    let views = clients
        .into_iter()
        .map(|client| ClientView::revealed(client, &state.cipher))
        .collect();

    Ok(Json(views))
}

/// Get one client
///
/// # Errors
///
/// - `404 Not Found`: no such client for this principal
pub async fn get_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ClientView>> {
    let client = Client::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    Ok(Json(ClientView::revealed(client, &state.cipher)))
}

/// Create a client
///
/// # Errors
///
/// - `422 Unprocessable Entity`: blank name, bad integrations, or a row the
///   store rejects
pub async fn create_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<ClientView>)> {
    req.validate()?;
    check_integrations(&req.integrations)?;

    let encrypted_password = encrypt_password(&state, req.password)?;

    let client = Client::create(
        &state.db,
        CreateClient {
            user_id: auth.user_id,
            name: req.name.trim().to_string(),
            access: req.access,
            status: req.status,
            encrypted_password,
            cnpj: req.cnpj.filter(|c| !c.trim().is_empty()),
            contact_info: req.contact_info,
            integrations: req.integrations,
        },
    )
    .await?;

    info!(client_id = %client.id, user_id = %auth.user_id, "Client created");

    Ok((
        StatusCode::CREATED,
        Json(ClientView::revealed(client, &state.cipher)),
    ))
}

/// Update a client
///
/// # Errors
///
/// - `404 Not Found`: no such client for this principal
/// - `422 Unprocessable Entity`: blank name or bad integrations
pub async fn update_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(mut req): Json<UpdateClientRequest>,
) -> ApiResult<Json<ClientView>> {
    check_not_blank("name", req.name.as_deref())?;
    let access = req.take_access()?;
    if let Some(integrations) = &req.integrations {
        check_integrations(integrations)?;
    }

    let update = UpdateClient {
        name: req.name.map(|n| n.trim().to_string()),
        access,
        status: req.status,
        encrypted_password: encrypt_password(&state, req.password)?,
        cnpj: req
            .cnpj
            .map(|c| Some(c.trim().to_string()).filter(|c| !c.is_empty())),
        contact_info: req.contact_info,
        integrations: req.integrations,
    };

    let client = Client::update(&state.db, auth.user_id, id, update).await?;

    info!(client_id = %id, "Client updated");
    Ok(Json(ClientView::revealed(client, &state.cipher)))
}

/// Delete a client
///
/// # Errors
///
/// - `404 Not Found`: no such client (including an already-deleted one)
pub async fn delete_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    Client::delete(&state.db, auth.user_id, id).await?;

    info!(client_id = %id, "Client deleted");
    Ok(StatusCode::NO_CONTENT)
}
