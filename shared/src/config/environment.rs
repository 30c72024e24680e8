//! Environment configuration module

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::LogLevel;

use super::parse_var;

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    Development,
    /// Staging/test environment
    Staging,
    /// Production environment
    Production,
}

impl Environment {
    /// Check if running in production
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Get environment from the first of `ENVIRONMENT`, `ENV`, `RUST_ENV` that is set
    pub fn from_vars<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("ENVIRONMENT")
            .or_else(|| lookup("ENV"))
            .or_else(|| lookup("RUST_ENV"))
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Minimum level written; anything below is dropped
    #[serde(default)]
    pub level: LogLevel,

    /// Folder holding one file per rotation
    #[serde(default = "default_folder")]
    pub folder: PathBuf,

    /// Size ceiling in bytes; reaching it rotates the current file
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Mirror every written entry to the console
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            folder: default_folder(),
            max_file_size: default_max_file_size(),
            console: default_console(),
        }
    }
}

impl LoggingConfig {
    /// Create a logging config writing into `folder`
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            ..Default::default()
        }
    }

    /// Set the minimum level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the rotation ceiling in bytes
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Disable the console mirror
    pub fn without_console(mut self) -> Self {
        self.console = false;
        self
    }

    /// Create from `LOG_LEVEL`, `LOG_FOLDER`, `LOG_MAX_FILE_SIZE`, `LOG_CONSOLE`
    pub fn from_vars<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            level: parse_var(lookup, "LOG_LEVEL", LogLevel::default()),
            folder: lookup("LOG_FOLDER")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_folder),
            max_file_size: parse_var(lookup, "LOG_MAX_FILE_SIZE", default_max_file_size()),
            console: parse_var(lookup, "LOG_CONSOLE", default_console()),
        }
    }
}

fn default_folder() -> PathBuf {
    PathBuf::from("logs")
}

fn default_max_file_size() -> u64 {
    1024 // 1 KiB
}

fn default_console() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_str() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert!("invalid".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_fallback_chain() {
        let lookup = |key: &str| match key {
            "RUST_ENV" => Some("production".to_string()),
            _ => None,
        };
        assert_eq!(Environment::from_vars(&lookup), Environment::Production);
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::new("/tmp/audit")
            .with_level(LogLevel::Warn)
            .with_max_file_size(4096)
            .without_console();

        assert_eq!(config.folder, PathBuf::from("/tmp/audit"));
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.max_file_size, 4096);
        assert!(!config.console);
    }
}
