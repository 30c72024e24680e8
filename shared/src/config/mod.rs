//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical business areas:
//! - `auth` - Token signing, TTLs and the gatekeeping allow-list
//! - `environment` - Environment detection and audit logging configuration
//! - `server` - HTTP server binding
//!
//! The whole configuration is read once at startup and handed to each
//! component by reference; nothing reads the environment afterwards.

pub mod auth;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};
use std::env;

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig};
pub use environment::{Environment, LoggingConfig};
pub use server::{ServerConfig, DEFAULT_MAX_BODY_SIZE};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Audit logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            environment: Environment::from_vars(&lookup),
            server: ServerConfig::from_vars(&lookup),
            auth: AuthConfig::from_vars(&lookup),
            logging: LoggingConfig::from_vars(&lookup),
        }
    }
}

/// Parses `key` with `FromStr`, falling back to `default` when unset or invalid
pub(crate) fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = AppConfig::from_vars(|_| None);

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.auth.jwt.access_token_expiry, 900);
        assert_eq!(config.auth.jwt.refresh_token_expiry, 86400);
        assert_eq!(config.logging.max_file_size, 1024);
        assert!(config.auth.allow_list.contains(&"/auth/login".to_string()));
    }

    #[test]
    fn test_overrides_from_variables() {
        let config = AppConfig::from_vars(lookup_from(&[
            ("ENVIRONMENT", "production"),
            ("PORT", "9000"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_ACCESS_TOKEN_EXPIRY", "60"),
            ("LOG_LEVEL", "error"),
            ("LOG_FOLDER", "/var/log/home-library"),
            ("LOG_MAX_FILE_SIZE", "1048576"),
            ("AUTH_ALLOW_LIST", "/auth/login, /doc"),
        ]));

        assert!(config.environment.is_production());
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.jwt.secret, "s3cret");
        assert_eq!(config.auth.jwt.access_token_expiry, 60);
        assert_eq!(config.logging.level, crate::LogLevel::Error);
        assert_eq!(config.logging.folder.to_str(), Some("/var/log/home-library"));
        assert_eq!(config.logging.max_file_size, 1_048_576);
        assert_eq!(config.auth.allow_list, vec!["/auth/login", "/doc"]);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = AppConfig::from_vars(lookup_from(&[
            ("PORT", "not-a-port"),
            ("LOG_MAX_FILE_SIZE", "-5"),
        ]));

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.logging.max_file_size, 1024);
    }
}
