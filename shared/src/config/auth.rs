//! Authentication configuration: token signing and the gatekeeping allow-list

use serde::{Deserialize, Serialize};

use super::parse_var;

const DEFAULT_SECRET: &str = "your-secret-key-change-in-production";

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            access_token_expiry: 900,    // 15 minutes
            refresh_token_expiry: 86400, // 1 day
            issuer: default_issuer(),
        }
    }
}

impl JwtConfig {
    /// Longest accepted token lifetime (ten years)
    pub const MAX_TOKEN_TTL_SECONDS: i64 = 10 * 365 * 86400;

    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Path prefixes that bypass token checks
    #[serde(default = "default_allow_list")]
    pub allow_list: Vec<String>,

    /// bcrypt cost used when hashing passwords at signup
    #[serde(default = "default_password_hash_cost")]
    pub password_hash_cost: u32,

    /// Whether `/auth/signup` creates new accounts
    #[serde(default = "default_allow_registration")]
    pub allow_registration: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            allow_list: default_allow_list(),
            password_hash_cost: default_password_hash_cost(),
            allow_registration: default_allow_registration(),
        }
    }
}

impl AuthConfig {
    /// Create from `JWT_SECRET`, `JWT_ACCESS_TOKEN_EXPIRY`, `JWT_REFRESH_TOKEN_EXPIRY`,
    /// `AUTH_ALLOW_LIST`, `CRYPT_SALT` and `AUTH_ALLOW_REGISTRATION`
    pub fn from_vars<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_defaults = JwtConfig::default();
        let allow_list = lookup("AUTH_ALLOW_LIST")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|prefix| !prefix.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|prefixes| !prefixes.is_empty())
            .unwrap_or_else(default_allow_list);

        Self {
            jwt: JwtConfig {
                secret: lookup("JWT_SECRET").unwrap_or(jwt_defaults.secret),
                access_token_expiry: parse_ttl(
                    lookup,
                    "JWT_ACCESS_TOKEN_EXPIRY",
                    jwt_defaults.access_token_expiry,
                ),
                refresh_token_expiry: parse_ttl(
                    lookup,
                    "JWT_REFRESH_TOKEN_EXPIRY",
                    jwt_defaults.refresh_token_expiry,
                ),
                issuer: jwt_defaults.issuer,
            },
            allow_list,
            password_hash_cost: parse_var(lookup, "CRYPT_SALT", default_password_hash_cost()),
            allow_registration: parse_var(lookup, "AUTH_ALLOW_REGISTRATION", default_allow_registration()),
        }
    }
}

/// Reads a TTL in seconds; negative or over-long values fall back to `default`
fn parse_ttl<F>(lookup: &F, key: &str, default: i64) -> i64
where
    F: Fn(&str) -> Option<String>,
{
    let ttl = parse_var(lookup, key, default);
    if (0..=JwtConfig::MAX_TOKEN_TTL_SECONDS).contains(&ttl) {
        ttl
    } else {
        default
    }
}

fn default_issuer() -> String {
    String::from("home-library")
}

fn default_allow_list() -> Vec<String> {
    ["/auth/signup", "/auth/login", "/auth/refresh", "/doc", "/health"]
        .iter()
        .map(|prefix| prefix.to_string())
        .collect()
}

fn default_password_hash_cost() -> u32 {
    10
}

fn default_allow_registration() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 86400);
        assert_eq!(config.issuer, "home-library");
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret")
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(14);

        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 1209600);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_out_of_range_ttls_fall_back_to_defaults() {
        let lookup = |key: &str| match key {
            "JWT_ACCESS_TOKEN_EXPIRY" => Some("-60".to_string()),
            "JWT_REFRESH_TOKEN_EXPIRY" => Some("10000000000000".to_string()),
            _ => None,
        };
        let config = AuthConfig::from_vars(&lookup);
        assert_eq!(config.jwt.access_token_expiry, 900);
        assert_eq!(config.jwt.refresh_token_expiry, 86400);
    }

    #[test]
    fn test_zero_and_maximum_ttls_are_accepted() {
        let lookup = |key: &str| match key {
            "JWT_ACCESS_TOKEN_EXPIRY" => Some("0".to_string()),
            "JWT_REFRESH_TOKEN_EXPIRY" => Some(JwtConfig::MAX_TOKEN_TTL_SECONDS.to_string()),
            _ => None,
        };
        let config = AuthConfig::from_vars(&lookup);
        assert_eq!(config.jwt.access_token_expiry, 0);
        assert_eq!(config.jwt.refresh_token_expiry, JwtConfig::MAX_TOKEN_TTL_SECONDS);
    }

    #[test]
    fn test_registration_switch() {
        assert!(AuthConfig::from_vars(&|_: &str| None).allow_registration);

        let lookup = |key: &str| (key == "AUTH_ALLOW_REGISTRATION").then(|| "false".to_string());
        assert!(!AuthConfig::from_vars(&lookup).allow_registration);
    }

    #[test]
    fn test_empty_allow_list_variable_keeps_defaults() {
        let lookup = |key: &str| match key {
            "AUTH_ALLOW_LIST" => Some(" , ".to_string()),
            _ => None,
        };
        let config = AuthConfig::from_vars(&lookup);
        assert_eq!(config.allow_list, default_allow_list());
    }
}
