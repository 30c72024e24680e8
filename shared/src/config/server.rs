//! Server configuration module

use serde::{Deserialize, Serialize};

use super::parse_var;

/// Largest request body the gatekeeper buffers (256 KiB, actix's own default)
pub const DEFAULT_MAX_BODY_SIZE: usize = 256 * 1024;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Largest request body accepted, in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 4000,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Create from `SERVER_HOST`, `PORT` and `MAX_BODY_SIZE`
    pub fn from_vars<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("SERVER_HOST").unwrap_or(defaults.host),
            port: parse_var(lookup, "PORT", defaults.port),
            max_body_size: parse_var(lookup, "MAX_BODY_SIZE", defaults.max_body_size),
        }
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        assert_eq!(ServerConfig::new("0.0.0.0", 8080).bind_address(), "0.0.0.0:8080");
        assert_eq!(ServerConfig::default().bind_address(), "127.0.0.1:4000");
    }

    #[test]
    fn test_max_body_size_from_variables() {
        let lookup = |key: &str| (key == "MAX_BODY_SIZE").then(|| "1024".to_string());
        assert_eq!(ServerConfig::from_vars(&lookup).max_body_size, 1024);
        assert_eq!(ServerConfig::from_vars(&|_: &str| None).max_body_size, 262_144);
    }
}
