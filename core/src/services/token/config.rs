//! Configuration for the token service

use chrono::Duration;
use hl_shared::config::JwtConfig;
use jsonwebtoken::Algorithm;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Value of the `iss` claim, checked on verification
    pub issuer: String,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(jwt: &JwtConfig) -> Self {
        Self {
            jwt_secret: jwt.secret.clone(),
            algorithm: Algorithm::HS256,
            access_token_ttl: ttl_from_seconds(jwt.access_token_expiry),
            refresh_token_ttl: ttl_from_seconds(jwt.refresh_token_expiry),
            issuer: jwt.issuer.clone(),
        }
    }
}

/// Clamps a configured lifetime into `0..=JwtConfig::MAX_TOKEN_TTL_SECONDS`
fn ttl_from_seconds(seconds: i64) -> Duration {
    Duration::seconds(seconds.clamp(0, JwtConfig::MAX_TOKEN_TTL_SECONDS))
}
