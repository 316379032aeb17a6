//! Credential cipher for client system passwords
//!
//! Passwords that staff need to read back (POS logins, remote access) are
//! stored encrypted with ChaCha20-Poly1305. Every call to [`CredentialCipher::encrypt`]
//! draws a fresh 96-bit nonce, so the same plaintext never produces the same
//! ciphertext twice.
//!
//! # Stored format
//!
//! ```text
//! base64( nonce[12] || ciphertext || tag[16] )
//! ```
//!
//! The key is never compiled in. It comes from configuration, either as a
//! base64-encoded 32-byte key or as a passphrase + salt pair run through
//! Argon2id.
//!
//! # Example
//!
//! ```
//! use suppy_shared::crypto::cipher::CredentialCipher;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let key = CredentialCipher::generate_key();
//! let cipher = CredentialCipher::from_base64_key(&key)?;
//!
//! let stored = cipher.encrypt("s3nha-do-caixa")?;
//! assert_eq!(cipher.decrypt(&stored), "s3nha-do-caixa");
//!
//! // Garbage never errors, it just comes back blank
//! assert_eq!(cipher.decrypt("not-a-ciphertext"), "");
//! # Ok(())
//! # }
//! ```

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use tracing::warn;
use zeroize::Zeroize;

/// Key length required by ChaCha20-Poly1305
pub const KEY_LEN: usize = 32;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Minimum salt length accepted for passphrase derivation
pub const MIN_SALT_LEN: usize = 8;

/// Error type for cipher construction and encryption
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    /// Raw key was not 32 bytes
    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// Key string was not valid base64
    #[error("key is not valid base64: {0}")]
    KeyDecode(String),

    /// Argon2id derivation failed (bad params or salt)
    #[error("key derivation failed: {0}")]
    Derivation(String),

    /// The AEAD refused to encrypt
    #[error("encryption failed: {0}")]
    Encryption(String),
}

/// Symmetric cipher for at-rest password obfuscation
///
/// Cheap to clone; holds only the 32-byte key. The key is wiped on drop.
#[derive(Clone)]
pub struct CredentialCipher {
    key: Key,
}

impl fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCipher").finish_non_exhaustive()
    }
}

impl Drop for CredentialCipher {
    fn drop(&mut self) {
        self.key.as_mut_slice().zeroize();
    }
}

impl CredentialCipher {
    /// Builds a cipher from raw key bytes (must be exactly 32 bytes)
    pub fn from_key_bytes(key_bytes: &[u8]) -> Result<Self, CipherError> {
        if key_bytes.len() != KEY_LEN {
            return Err(CipherError::InvalidKeyLength(key_bytes.len()));
        }

        let mut key = Key::default();
        key.copy_from_slice(key_bytes);
        Ok(Self { key })
    }

    /// Builds a cipher from a base64-encoded 32-byte key
    ///
    /// This is the format produced by [`CredentialCipher::generate_key`] and
    /// expected in the `CREDENTIAL_KEY` environment variable.
    pub fn from_base64_key(encoded: &str) -> Result<Self, CipherError> {
        let mut decoded = STANDARD
            .decode(encoded.trim().as_bytes())
            .map_err(|e| CipherError::KeyDecode(e.to_string()))?;

        let cipher = Self::from_key_bytes(&decoded);
        decoded.zeroize();
        cipher
    }

    /// Derives the key from a passphrase with Argon2id
    ///
    /// The salt must be at least 8 bytes and stay fixed for the lifetime of
    /// the stored ciphertexts; changing it makes every stored password
    /// unreadable.
    pub fn from_passphrase(passphrase: &str, salt: &[u8]) -> Result<Self, CipherError> {
        if salt.len() < MIN_SALT_LEN {
            return Err(CipherError::Derivation(format!(
                "salt must be at least {} bytes",
                MIN_SALT_LEN
            )));
        }

        let params = Params::new(19 * 1024, 3, 1, Some(KEY_LEN))
            .map_err(|e| CipherError::Derivation(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut output = [0u8; KEY_LEN];
        argon2
            .hash_password_into(passphrase.as_bytes(), salt, &mut output)
            .map_err(|e| CipherError::Derivation(e.to_string()))?;

        let cipher = Self::from_key_bytes(&output);
        output.zeroize();
        cipher
    }

    /// Generates a fresh random key, base64-encoded
    pub fn generate_key() -> String {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        let encoded = STANDARD.encode(bytes);
        bytes.zeroize();
        encoded
    }

    /// Encrypts a plaintext password
    ///
    /// An empty plaintext short-circuits to an empty string so that "no
    /// password" is stored as blank rather than as an encrypted blank.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let cipher = ChaCha20Poly1305::new(&self.key);
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

        let sealed = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| CipherError::Encryption(e.to_string()))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + sealed.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&sealed);

        Ok(STANDARD.encode(payload))
    }

    /// Decrypts a stored password
    ///
    /// Never fails: empty input, malformed base64, truncated payloads,
    /// ciphertexts sealed under another key and non-UTF-8 plaintexts all
    /// come back as an empty string. The failure is logged.
    pub fn decrypt(&self, ciphertext: &str) -> String {
        if ciphertext.is_empty() {
            return String::new();
        }

        match self.try_decrypt(ciphertext) {
            Ok(plaintext) => plaintext,
            Err(reason) => {
                warn!(reason = %reason, "Failed to decrypt stored credential");
                String::new()
            }
        }
    }

    fn try_decrypt(&self, ciphertext: &str) -> Result<String, String> {
        let payload = STANDARD
            .decode(ciphertext.trim().as_bytes())
            .map_err(|e| format!("invalid base64: {}", e))?;

        if payload.len() < NONCE_LEN + TAG_LEN {
            return Err(format!("payload too short ({} bytes)", payload.len()));
        }

        let (nonce, sealed) = payload.split_at(NONCE_LEN);
        let cipher = ChaCha20Poly1305::new(&self.key);

        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| "authentication failed".to_string())?;

        String::from_utf8(plaintext).map_err(|_| "plaintext is not UTF-8".to_string())
    }
}
