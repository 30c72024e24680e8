//! Configuration for the authentication service

use hl_shared::config::AuthConfig;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// bcrypt cost factor used when hashing new passwords
    pub password_hash_cost: u32,
    /// Whether to allow registration of new users
    pub allow_registration: bool,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            password_hash_cost: bcrypt::DEFAULT_COST,
            allow_registration: true,
        }
    }
}

impl From<&AuthConfig> for AuthServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            password_hash_cost: config.password_hash_cost,
            allow_registration: config.allow_registration,
        }
    }
}
