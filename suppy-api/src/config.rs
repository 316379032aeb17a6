//! Configuration management for the API server
//!
//! Loads configuration from environment variables (and a `.env` file in
//! development).
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
//! - `API_HOST`: host to bind to (default: 0.0.0.0)
//! - `API_PORT`: port to bind to (default: 8080)
//! - `JWT_SECRET`: auth provider's JWT secret, at least 32 characters (required)
//! - `JWT_AUDIENCE`: expected `aud` claim (default: authenticated)
//! - `CREDENTIAL_KEY`: base64 32-byte key for stored client passwords, or
//! - `CREDENTIAL_PASSPHRASE` + `CREDENTIAL_SALT`: passphrase-derived key
//! - `CORS_ORIGINS`: comma-separated origins, `*` for any (default: *)
//! - `RUN_MIGRATIONS`: apply pending migrations on startup (default: true)
//! - `RUST_LOG`: log filter
//!
//! # Example
//!
//! ```no_run
//! use suppy_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use std::env;
use std::fmt;

use anyhow::Context;
use suppy_shared::auth::jwt::DEFAULT_AUDIENCE;
use suppy_shared::crypto::cipher::CredentialCipher;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub credentials: CredentialSource,

    /// Apply pending migrations before serving
    pub run_migrations: bool,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Provider's signing secret
    pub secret: String,

    pub audience: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("audience", &self.audience)
            .finish()
    }
}

/// Where the credential cipher key comes from
#[derive(Clone)]
pub enum CredentialSource {
    /// Base64-encoded 32-byte key
    Key(String),

    /// Argon2id-derived key
    Passphrase { passphrase: String, salt: String },
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Key(_) => f.write_str("CredentialSource::Key(<redacted>)"),
            CredentialSource::Passphrase { .. } => {
                f.write_str("CredentialSource::Passphrase(<redacted>)")
            }
        }
    }
}

impl CredentialSource {
    /// Builds the cipher used for client system passwords
    pub fn build_cipher(&self) -> anyhow::Result<CredentialCipher> {
        let cipher = match self {
            CredentialSource::Key(key) => CredentialCipher::from_base64_key(key)
                .context("CREDENTIAL_KEY must be a base64-encoded 32-byte key")?,
            CredentialSource::Passphrase { passphrase, salt } => {
                CredentialCipher::from_passphrase(passphrase, salt.as_bytes())
                    .context("failed to derive credential key from CREDENTIAL_PASSPHRASE")?
            }
        };

        Ok(cipher)
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does not
    /// parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a port number")?;

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let jwt_secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }
        let audience = var("JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_AUDIENCE.to_string());

        let credentials = match (
            var("CREDENTIAL_KEY"),
            var("CREDENTIAL_PASSPHRASE"),
            var("CREDENTIAL_SALT"),
        ) {
            (Some(key), _, _) => CredentialSource::Key(key),
            (None, Some(passphrase), Some(salt)) => CredentialSource::Passphrase { passphrase, salt },
            (None, Some(_), None) => {
                anyhow::bail!("CREDENTIAL_SALT is required when CREDENTIAL_PASSPHRASE is set")
            }
            (None, None, _) => anyhow::bail!(
                "CREDENTIAL_KEY (or CREDENTIAL_PASSPHRASE and CREDENTIAL_SALT) is required"
            ),
        };

        let run_migrations = match var("RUN_MIGRATIONS").as_deref() {
            None => true,
            Some(value) => parse_bool(value)
                .ok_or_else(|| anyhow::anyhow!("RUN_MIGRATIONS must be true or false"))?,
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                audience,
            },
            credentials,
            run_migrations,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// True when any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DATABASE_URL", "postgresql://localhost/suppy"),
            ("JWT_SECRET", SECRET),
            ("CREDENTIAL_PASSPHRASE", "correct horse battery"),
            ("CREDENTIAL_SALT", "suppy-salt-0001"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = load(&minimal()).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.audience, "authenticated");
        assert!(config.allows_any_origin());
        assert!(config.run_migrations);
        assert!(matches!(config.credentials, CredentialSource::Passphrase { .. }));
    }

    #[test]
    fn test_overrides() {
        let mut vars = minimal();
        vars.extend([
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "3000"),
            ("CORS_ORIGINS", "https://app.suppy.dev, https://admin.suppy.dev"),
            ("RUN_MIGRATIONS", "false"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.api.cors_origins.len(), 2);
        assert!(!config.allows_any_origin());
        assert!(!config.run_migrations);
        assert_eq!(config.database.max_connections, 4);
    }

    #[test]
    fn test_missing_required() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());

        let mut no_key = minimal();
        no_key.retain(|(k, _)| !k.starts_with("CREDENTIAL"));
        let err = load(&no_key).unwrap_err();
        assert!(err.to_string().contains("CREDENTIAL_KEY"));

        let mut no_salt = minimal();
        no_salt.retain(|(k, _)| *k != "CREDENTIAL_SALT");
        assert!(load(&no_salt).is_err());
    }

    #[test]
    fn test_short_jwt_secret() {
        let mut vars = minimal();
        vars.retain(|(k, _)| *k != "JWT_SECRET");
        vars.push(("JWT_SECRET", "short"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_credential_key_wins_and_builds() {
        let key = CredentialCipher::generate_key();
        let mut vars: Vec<(&str, &str)> = minimal();
        vars.push(("CREDENTIAL_KEY", key.as_str()));

        let config = load(&vars).unwrap();
        assert!(matches!(config.credentials, CredentialSource::Key(_)));

        let cipher = config.credentials.build_cipher().unwrap();
        let stored = cipher.encrypt("x").unwrap();
        assert_eq!(cipher.decrypt(&stored), "x");
    }

    #[test]
    fn test_bad_credential_key() {
        let source = CredentialSource::Key("not-a-key".to_string());
        assert!(source.build_cipher().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&minimal()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains(SECRET));
        assert!(!rendered.contains("correct horse"));
    }
}
