//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup. The session signing secret has no fallback:
//! startup fails if it is missing or too short.

use std::env;
use std::str::FromStr;

/// Minimum length of the session signing secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Which persistence backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Cloud Firestore (or the emulator via FIRESTORE_EMULATOR_HOST)
    Firestore,
    /// In-process store; data is lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid(
                "STORE_BACKEND",
                format!("unknown backend '{s}', expected 'firestore' or 'memory'"),
            )),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Google OAuth client ID; expected audience of ID tokens
    pub google_client_id: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Persistence backend
    pub store_backend: StoreBackend,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_signing_key = lookup("JWT_SECRET")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?
            .into_bytes();

        if jwt_signing_key.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid(
                "JWT_SECRET",
                format!("must be at least {MIN_JWT_SECRET_LEN} bytes"),
            ));
        }

        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Firestore,
        };

        Ok(Self {
            google_client_id: lookup("GOOGLE_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            gcp_project_id: lookup("GCP_PROJECT_ID").unwrap_or_else(|| "local-dev".to_string()),
            store_backend,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key,
        })
    }

    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            google_client_id: "test-client-id.apps.googleusercontent.com".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            store_backend: StoreBackend::Memory,
            port: 8080,
            jwt_signing_key: b"test_jwt_key_at_least_32_bytes_long!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_from_vars() {
        let config = Config::from_vars(vars(&[
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("GOOGLE_CLIENT_ID", "client"),
            ("STORE_BACKEND", "memory"),
        ]))
        .expect("Config should load");

        assert_eq!(config.google_client_id, "client");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 8080);
        assert_eq!(config.gcp_project_id, "local-dev");
    }

    #[test]
    fn test_missing_secret_fails_closed() {
        let err = Config::from_vars(vars(&[("GOOGLE_CLIENT_ID", "client")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

        let err = Config::from_vars(vars(&[
            ("JWT_SECRET", "   "),
            ("GOOGLE_CLIENT_ID", "client"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = Config::from_vars(vars(&[
            ("JWT_SECRET", "your-secret-key"),
            ("GOOGLE_CLIENT_ID", "client"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("JWT_SECRET", _)));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = Config::from_vars(vars(&[
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("GOOGLE_CLIENT_ID", "client"),
            ("STORE_BACKEND", "mongodb"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("STORE_BACKEND", _)));
    }

    #[test]
    fn test_default_secret_is_long_enough() {
        assert!(Config::test_default().jwt_signing_key.len() >= MIN_JWT_SECRET_LEN);
    }
}
