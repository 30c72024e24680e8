//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TokenError;

/// Discriminates access tokens from refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token presented on every gated request
    Access,
    /// Long-lived token exchanged for a new pair
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subject of a token: who the bearer claims to be
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Opaque user identifier
    pub user_id: String,
    /// Login name
    pub login: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, login: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            login: login.into(),
        }
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Login name of the subject
    pub login: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Access or refresh
    pub kind: TokenKind,
}

impl Claims {
    /// Creates claims for `identity` issued at `issued_at` and valid for `ttl`
    ///
    /// # Arguments
    ///
    /// * `identity` - Subject of the token
    /// * `kind` - Access or refresh
    /// * `issued_at` - Current time according to the service clock
    /// * `ttl` - Lifetime; zero yields a token that is already expired
    /// * `issuer` - Value of the `iss` claim
    ///
    /// Fails with `TokenError::GenerationFailed` when the expiry falls
    /// outside the representable date range.
    pub fn new(
        identity: &Identity,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        issuer: &str,
    ) -> Result<Self, TokenError> {
        let expiry = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenError::GenerationFailed)?;

        Ok(Self {
            sub: identity.user_id.clone(),
            login: identity.login.clone(),
            iat: issued_at.timestamp(),
            exp: expiry.timestamp(),
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
            kind,
        })
    }

    /// A token expiring exactly at `now` is already expired
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// The identity carried by these claims
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub.clone(), self.login.clone())
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn identity() -> Identity {
        Identity::new("7b0c6c4e-1111-4a5b-9c2d-000000000001", "alice")
    }

    #[test]
    fn test_access_token_claims() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let claims = Claims::new(&identity(), TokenKind::Access, now, Duration::minutes(15), "home-library").unwrap();

        assert_eq!(claims.sub, identity().user_id);
        assert_eq!(claims.login, "alice");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, now.timestamp() + 900);
        assert_eq!(claims.kind, TokenKind::Access);
        assert!(!claims.is_expired_at(now));
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let claims = Claims::new(&identity(), TokenKind::Access, now, Duration::seconds(30), "home-library").unwrap();

        assert!(!claims.is_expired_at(now + Duration::seconds(29)));
        assert!(claims.is_expired_at(now + Duration::seconds(30)));
        assert!(claims.is_expired_at(now + Duration::seconds(31)));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let now = Utc::now();
        let claims = Claims::new(&identity(), TokenKind::Refresh, now, Duration::zero(), "home-library").unwrap();
        assert!(claims.is_expired_at(now));
    }

    #[test]
    fn test_each_token_gets_unique_jti() {
        let now = Utc::now();
        let a = Claims::new(&identity(), TokenKind::Access, now, Duration::minutes(1), "home-library").unwrap();
        let b = Claims::new(&identity(), TokenKind::Access, now, Duration::minutes(1), "home-library").unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let now = Utc::now();
        let claims = Claims::new(&identity(), TokenKind::Refresh, now, Duration::days(1), "home-library").unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["kind"], "refresh");
    }

    #[test]
    fn test_expiry_out_of_range_fails_instead_of_overflowing() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let result = Claims::new(&identity(), TokenKind::Refresh, now, Duration::days(365_000_000), "home-library");
        assert_eq!(result.unwrap_err(), TokenError::GenerationFailed);
    }

    #[test]
    fn test_token_pair_wire_format() {
        let pair = TokenPair::new("a.b.c".to_string(), "d.e.f".to_string());
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json, serde_json::json!({ "accessToken": "a.b.c", "refreshToken": "d.e.f" }));
    }
}
