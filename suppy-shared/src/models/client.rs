//! Client model and database operations
//!
//! A client is a business running one of the two supported point-of-sale
//! systems. How staff log into that system depends on which one it is, so
//! the login fields are modelled as [`SystemAccess`], a union keyed by the
//! system:
//!
//! | system  | `login_code` column | `system_login` column |
//! |---------|---------------------|-----------------------|
//! | winfood | always NULL         | operator name         |
//! | cplug   | login code          | username              |
//!
//! The system password is stored only as ciphertext produced by
//! [`crate::crypto::cipher::CredentialCipher`].
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE clients (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     user_id UUID NOT NULL,
//!     name TEXT NOT NULL,
//!     system client_system NOT NULL,
//!     status client_status NOT NULL DEFAULT 'implantation',
//!     login_code TEXT,
//!     system_login TEXT,
//!     encrypted_password TEXT,
//!     cnpj TEXT,
//!     contact_info JSONB NOT NULL DEFAULT '[]',
//!     integrations JSONB NOT NULL DEFAULT '[]',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use suppy_shared::models::client::{Client, ClientStatus, CreateClient, SystemAccess, UpdateClient};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
//! let client = Client::create(&pool, CreateClient {
//!     user_id,
//!     name: "Pizzaria Bella".to_string(),
//!     access: SystemAccess::Cplug {
//!         login_code: Some("4821".to_string()),
//!         username: Some("admin".to_string()),
//!     },
//!     status: ClientStatus::Implantation,
//!     encrypted_password: None,
//!     cnpj: None,
//!     contact_info: vec![],
//!     integrations: vec![],
//! }).await?;
//!
//! // Go live; the stored password is untouched because it is not in the update
//! Client::update(&pool, user_id, client.id, UpdateClient {
//!     status: Some(ClientStatus::Active),
//!     ..Default::default()
//! }).await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::integration::Integration;

const CLIENT_COLUMNS: &str = "id, user_id, name, system, status, login_code, system_login, \
     encrypted_password, cnpj, contact_info, integrations, created_at";

/// Point-of-sale system used by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "client_system", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClientSystem {
    Winfood,
    Cplug,
}

impl ClientSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientSystem::Winfood => "winfood",
            ClientSystem::Cplug => "cplug",
        }
    }
}

/// Where a client is in its lifecycle with us
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "client_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    /// Being installed / onboarded
    Implantation,

    Active,

    Inactive,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Implantation => "implantation",
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
        }
    }
}

/// System-specific login details
///
/// Serialized with a `system` tag so it can be flattened into the client:
/// `{"system": "cplug", "login_code": "4821", "username": "admin"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "lowercase")]
pub enum SystemAccess {
    /// Winfood logs in by operator name
    Winfood {
        #[serde(default)]
        operator: Option<String>,
    },

    /// Cplug logs in with a store code plus username
    Cplug {
        #[serde(default)]
        login_code: Option<String>,
        #[serde(default)]
        username: Option<String>,
    },
}

impl SystemAccess {
    pub fn system(&self) -> ClientSystem {
        match self {
            SystemAccess::Winfood { .. } => ClientSystem::Winfood,
            SystemAccess::Cplug { .. } => ClientSystem::Cplug,
        }
    }

    /// Value of the `login_code` column (cplug only)
    pub fn login_code(&self) -> Option<&str> {
        match self {
            SystemAccess::Winfood { .. } => None,
            SystemAccess::Cplug { login_code, .. } => login_code.as_deref(),
        }
    }

    /// Value of the `system_login` column: operator for winfood, username for cplug
    pub fn system_login(&self) -> Option<&str> {
        match self {
            SystemAccess::Winfood { operator } => operator.as_deref(),
            SystemAccess::Cplug { username, .. } => username.as_deref(),
        }
    }

    /// Rebuilds the union from the three stored columns
    ///
    /// A login code left on a winfood row is dropped.
    pub fn from_columns(
        system: ClientSystem,
        login_code: Option<String>,
        system_login: Option<String>,
    ) -> Self {
        match system {
            ClientSystem::Winfood => SystemAccess::Winfood {
                operator: system_login,
            },
            ClientSystem::Cplug => SystemAccess::Cplug {
                login_code,
                username: system_login,
            },
        }
    }
}

/// One free-form way of reaching the client (phone, email, WhatsApp...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(rename = "type")]
    pub kind: String,

    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Client account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,

    /// Principal that owns the row
    pub user_id: Uuid,

    pub name: String,

    /// System tag and login fields
    #[serde(flatten)]
    pub access: SystemAccess,

    pub status: ClientStatus,

    /// Ciphertext of the system password (never plaintext)
    pub encrypted_password: Option<String>,

    /// Brazilian tax id
    pub cnpj: Option<String>,

    pub contact_info: Vec<ContactInfo>,

    pub integrations: Vec<Integration>,

    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn system(&self) -> ClientSystem {
        self.access.system()
    }
}

#[derive(sqlx::FromRow)]
struct ClientRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    system: ClientSystem,
    status: ClientStatus,
    login_code: Option<String>,
    system_login: Option<String>,
    encrypted_password: Option<String>,
    cnpj: Option<String>,
    contact_info: Json<Vec<ContactInfo>>,
    integrations: Json<Vec<Integration>>,
    created_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            access: SystemAccess::from_columns(row.system, row.login_code, row.system_login),
            status: row.status,
            encrypted_password: row.encrypted_password,
            cnpj: row.cnpj,
            contact_info: row.contact_info.0,
            integrations: row.integrations.0,
            created_at: row.created_at,
        }
    }
}

/// Input for creating a client
///
/// `user_id` is required: the caller attaches the principal, the service
/// never fills it in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClient {
    pub user_id: Uuid,

    pub name: String,

    #[serde(flatten)]
    pub access: SystemAccess,

    pub status: ClientStatus,

    /// Already-encrypted password, if one was given
    #[serde(default)]
    pub encrypted_password: Option<String>,

    #[serde(default)]
    pub cnpj: Option<String>,

    #[serde(default)]
    pub contact_info: Vec<ContactInfo>,

    #[serde(default)]
    pub integrations: Vec<Integration>,
}

/// Partial update for a client
///
/// Only `Some` fields are written. Leave `encrypted_password` as `None` to
/// keep the stored ciphertext; there is no way to overwrite it with blank.
#[derive(Debug, Clone, Default)]
pub struct UpdateClient {
    pub name: Option<String>,

    /// Replaces system, login code and system login together
    pub access: Option<SystemAccess>,

    pub status: Option<ClientStatus>,

    pub encrypted_password: Option<String>,

    /// `Some(None)` clears the tax id
    pub cnpj: Option<Option<String>>,

    pub contact_info: Option<Vec<ContactInfo>>,

    pub integrations: Option<Vec<Integration>>,
}

impl UpdateClient {
    /// True when no column would be written
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.access.is_none()
            && self.status.is_none()
            && self.encrypted_password.is_none()
            && self.cnpj.is_none()
            && self.contact_info.is_none()
            && self.integrations.is_none()
    }

    fn set_clause(&self) -> String {
        // $1 = id, $2 = user_id
        let mut sets: Vec<String> = Vec::new();
        let mut bind_count = 2;
        let mut next = |column: &str| {
            bind_count += 1;
            format!("{} = ${}", column, bind_count)
        };

        if self.name.is_some() {
            sets.push(next("name"));
        }
        if self.access.is_some() {
            sets.push(next("system"));
            sets.push(next("login_code"));
            sets.push(next("system_login"));
        }
        if self.status.is_some() {
            sets.push(next("status"));
        }
        if self.encrypted_password.is_some() {
            sets.push(next("encrypted_password"));
        }
        if self.cnpj.is_some() {
            sets.push(next("cnpj"));
        }
        if self.contact_info.is_some() {
            sets.push(next("contact_info"));
        }
        if self.integrations.is_some() {
            sets.push(next("integrations"));
        }

        sets.join(", ")
    }
}

impl Client {
    /// Lists the principal's clients, newest first
    pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM clients WHERE user_id = $1 ORDER BY created_at DESC",
            CLIENT_COLUMNS
        );

        let rows = sqlx::query_as::<_, ClientRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        debug!(%user_id, count = rows.len(), "Listed clients");
        Ok(rows.into_iter().map(Client::from).collect())
    }

    /// Finds one of the principal's clients by ID
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM clients WHERE id = $1 AND user_id = $2",
            CLIENT_COLUMNS
        );

        let row = sqlx::query_as::<_, ClientRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Client::from))
    }

    /// Creates a client
    ///
    /// # Errors
    ///
    /// Returns the store's error when a constraint rejects the row (blank
    /// name, login code on a winfood client).
    pub async fn create(pool: &PgPool, data: CreateClient) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO clients (user_id, name, system, status, login_code, system_login,
                                 encrypted_password, cnpj, contact_info, integrations)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        );

        let row = sqlx::query_as::<_, ClientRow>(&query)
            .bind(data.user_id)
            .bind(&data.name)
            .bind(data.access.system())
            .bind(data.status)
            .bind(data.access.login_code())
            .bind(data.access.system_login())
            .bind(data.encrypted_password)
            .bind(data.cnpj)
            .bind(Json(data.contact_info))
            .bind(Json(data.integrations))
            .fetch_one(pool)
            .await?;

        debug!(client_id = %row.id, system = row.system.as_str(), "Created client");
        Ok(row.into())
    }

    /// Applies a partial update to one of the principal's clients
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` if the client does not exist (or belongs to
    /// someone else).
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateClient,
    ) -> Result<Self, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, user_id, id)
                .await?
                .ok_or(sqlx::Error::RowNotFound);
        }

        let query = format!(
            "UPDATE clients SET {} WHERE id = $1 AND user_id = $2 RETURNING {}",
            data.set_clause(),
            CLIENT_COLUMNS
        );

        let mut q = sqlx::query_as::<_, ClientRow>(&query).bind(id).bind(user_id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(access) = data.access {
            q = q
                .bind(access.system())
                .bind(access.login_code().map(str::to_owned))
                .bind(access.system_login().map(str::to_owned));
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(encrypted_password) = data.encrypted_password {
            q = q.bind(encrypted_password);
        }
        if let Some(cnpj) = data.cnpj {
            q = q.bind(cnpj);
        }
        if let Some(contact_info) = data.contact_info {
            q = q.bind(Json(contact_info));
        }
        if let Some(integrations) = data.integrations {
            q = q.bind(Json(integrations));
        }

        let row = q.fetch_optional(pool).await?.ok_or(sqlx::Error::RowNotFound)?;

        debug!(client_id = %id, "Updated client");
        Ok(row.into())
    }

    /// Deletes one of the principal's clients (and, by cascade, its tasks)
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` if nothing was deleted, which includes a
    /// second delete of the same ID.
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        debug!(client_id = %id, "Deleted client");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_access_columns() {
        let winfood = SystemAccess::Winfood {
            operator: Some("Maria".to_string()),
        };
        assert_eq!(winfood.system(), ClientSystem::Winfood);
        assert_eq!(winfood.login_code(), None);
        assert_eq!(winfood.system_login(), Some("Maria"));

        let cplug = SystemAccess::Cplug {
            login_code: Some("4821".to_string()),
            username: Some("admin".to_string()),
        };
        assert_eq!(cplug.system(), ClientSystem::Cplug);
        assert_eq!(cplug.login_code(), Some("4821"));
        assert_eq!(cplug.system_login(), Some("admin"));
    }

    #[test]
    fn test_from_columns_drops_winfood_login_code() {
        let access = SystemAccess::from_columns(
            ClientSystem::Winfood,
            Some("stale".to_string()),
            Some("Operador 1".to_string()),
        );

        assert_eq!(
            access,
            SystemAccess::Winfood {
                operator: Some("Operador 1".to_string())
            }
        );
    }

    #[test]
    fn test_create_client_requires_user_id() {
        let payload = json!({
            "name": "Lanchonete",
            "system": "winfood",
            "operator": "caixa",
            "status": "active"
        });

        assert!(serde_json::from_value::<CreateClient>(payload).is_err());
    }

    #[test]
    fn test_create_client_deserializes_flattened_access() {
        let payload = json!({
            "user_id": Uuid::nil(),
            "name": "Lanchonete",
            "system": "cplug",
            "login_code": "77",
            "username": "gerente",
            "status": "implantation"
        });

        let data: CreateClient = serde_json::from_value(payload).unwrap();
        assert_eq!(data.access.login_code(), Some("77"));
        assert_eq!(data.access.system_login(), Some("gerente"));
        assert!(data.integrations.is_empty());
    }

    #[test]
    fn test_client_serializes_system_tag() {
        let client = Client {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            name: "Bar do Zé".to_string(),
            access: SystemAccess::Winfood {
                operator: Some("Zé".to_string()),
            },
            status: ClientStatus::Active,
            encrypted_password: None,
            cnpj: None,
            contact_info: vec![ContactInfo {
                kind: "phone".to_string(),
                value: "+55 11 99999-0000".to_string(),
                name: None,
            }],
            integrations: vec![],
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&client).unwrap();
        assert_eq!(value["system"], "winfood");
        assert_eq!(value["operator"], "Zé");
        assert_eq!(value["status"], "active");
        assert_eq!(value["contact_info"][0]["type"], "phone");
        assert!(value.get("login_code").is_none());
    }

    #[test]
    fn test_update_client_default_is_empty() {
        let update = UpdateClient::default();
        assert!(update.is_empty());
        assert!(update.encrypted_password.is_none());
    }

    #[test]
    fn test_set_clause_omits_password_when_absent() {
        let update = UpdateClient {
            name: Some("X".to_string()),
            ..Default::default()
        };

        assert_eq!(update.set_clause(), "name = $3");
        assert!(!update.set_clause().contains("encrypted_password"));
    }

    #[test]
    fn test_set_clause_numbers_binds_in_order() {
        let update = UpdateClient {
            access: Some(SystemAccess::Winfood { operator: None }),
            encrypted_password: Some("cipher".to_string()),
            cnpj: Some(None),
            ..Default::default()
        };

        assert_eq!(
            update.set_clause(),
            "system = $3, login_code = $4, system_login = $5, encrypted_password = $6, cnpj = $7"
        );
    }
}
