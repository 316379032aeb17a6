//! Client rows prepared for display
//!
//! The client list shows the system password in clear so staff can read it
//! out over the phone; the dashboard only shows that one exists.

use serde::Serialize;

use crate::crypto::cipher::CredentialCipher;
use crate::models::client::Client;

/// Placeholder shown instead of a stored password
pub const MASKED_PASSWORD: &str = "******";

/// A client plus its password in display form
#[derive(Debug, Clone, Serialize)]
pub struct ClientView {
    #[serde(flatten)]
    pub client: Client,

    /// `None` when no password is stored. An unreadable ciphertext shows as
    /// an empty string.
    pub password: Option<String>,
}

impl ClientView {
    /// Decrypts the stored password
    pub fn revealed(client: Client, cipher: &CredentialCipher) -> Self {
        let password = stored_ciphertext(&client).map(|ciphertext| cipher.decrypt(ciphertext));
        Self { client, password }
    }

    /// Replaces the stored password with [`MASKED_PASSWORD`]
    pub fn masked(client: Client) -> Self {
        let password = stored_ciphertext(&client).map(|_| MASKED_PASSWORD.to_string());
        Self { client, password }
    }
}

fn stored_ciphertext(client: &Client) -> Option<&str> {
    client
        .encrypted_password
        .as_deref()
        .filter(|ciphertext| !ciphertext.is_empty())
}
