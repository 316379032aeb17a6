//! Third-party access credentials attached to a client
//!
//! Integrations live inside the client row (`clients.integrations`, JSONB) and
//! have no lifecycle of their own. Each variant carries the login field the
//! third-party service uses, plus an optional password.
//!
//! # Wire format
//!
//! ```json
//! [
//!   { "type": "anydesk",  "id": "5f0c...", "access": "123 456 789", "password": "..." },
//!   { "type": "ifood",    "id": "7a1e...", "username": "loja-centro" },
//!   { "type": "anota_ai", "id": "c93d...", "email": "contato@loja.com.br" }
//! ]
//! ```
//!
//! The `id` is generated by the front end to tell entries apart while editing;
//! the store treats it as opaque.

use serde::{Deserialize, Serialize};

/// Which third-party service an integration belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    Anydesk,
    Ifood,
    AnotaAi,
}

impl IntegrationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationKind::Anydesk => "anydesk",
            IntegrationKind::Ifood => "ifood",
            IntegrationKind::AnotaAi => "anota_ai",
        }
    }
}

/// Credentials for one third-party service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Integration {
    /// AnyDesk remote access (access code + password)
    Anydesk {
        id: String,
        access: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },

    /// iFood merchant portal (username + password)
    Ifood {
        id: String,
        username: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },

    /// Anota AI ordering bot (email + password)
    AnotaAi {
        id: String,
        email: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
}

impl Integration {
    /// UI-scoped identifier
    pub fn id(&self) -> &str {
        match self {
            Integration::Anydesk { id, .. }
            | Integration::Ifood { id, .. }
            | Integration::AnotaAi { id, .. } => id,
        }
    }

    pub fn kind(&self) -> IntegrationKind {
        match self {
            Integration::Anydesk { .. } => IntegrationKind::Anydesk,
            Integration::Ifood { .. } => IntegrationKind::Ifood,
            Integration::AnotaAi { .. } => IntegrationKind::AnotaAi,
        }
    }
}

/// Checks a client's integration list before it is stored
///
/// Every entry needs a non-blank id, and ids must be unique within the list.
pub fn validate_integrations(integrations: &[Integration]) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();

    for integration in integrations {
        let id = integration.id().trim();
        if id.is_empty() {
            return Err(format!(
                "{} integration is missing its id",
                integration.kind().as_str()
            ));
        }
        if !seen.insert(id) {
            return Err(format!("duplicate integration id: {}", id));
        }
    }

    Ok(())
}
