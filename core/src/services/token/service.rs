//! Main token service implementation

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::entities::token::{Claims, Identity, TokenKind, TokenPair};
use crate::errors::{DomainError, TokenError};
use crate::services::clock::Clock;

use super::config::TokenServiceConfig;

/// Service for issuing and verifying bearer tokens.
///
/// Holds no mutable state: every result is a function of the token, the
/// static secret and the clock, so one instance is shared by all requests.
pub struct TokenService {
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `config` - Token service configuration
    /// * `clock` - Time source used for `iat`, `exp` and expiry checks
    pub fn new(config: TokenServiceConfig, clock: Arc<dyn Clock>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        // Expiry is checked against `clock` in `verify`, not by jsonwebtoken
        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
            clock,
        }
    }

    /// Signs a short-lived access token for `identity`
    pub fn issue_access_token(&self, identity: &Identity) -> Result<String, DomainError> {
        self.issue(identity, TokenKind::Access, self.config.access_token_ttl)
    }

    /// Signs a long-lived refresh token for `identity`
    pub fn issue_refresh_token(&self, identity: &Identity) -> Result<String, DomainError> {
        self.issue(identity, TokenKind::Refresh, self.config.refresh_token_ttl)
    }

    /// Signs an access/refresh pair for `identity`
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, DomainError> {
        Ok(TokenPair::new(
            self.issue_access_token(identity)?,
            self.issue_refresh_token(identity)?,
        ))
    }

    fn issue(&self, identity: &Identity, kind: TokenKind, ttl: Duration) -> Result<String, DomainError> {
        let claims = Claims::new(identity, kind, self.clock.now(), ttl, &self.config.issuer)?;
        self.encode_jwt(&claims)
    }

    /// Encodes claims into a JWT
    pub(crate) fn encode_jwt(&self, claims: &Claims) -> Result<String, DomainError> {
        let header = Header::new(self.config.algorithm);
        encode(&header, claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::GenerationFailed))
    }

    /// Verifies signature, issuer and expiry of a token of either kind
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - The decoded claims if valid
    /// * `Err(TokenError::InvalidSignature)` - Signed with another secret or tampered
    /// * `Err(TokenError::Expired)` - `now >= exp`
    /// * `Err(TokenError::Malformed)` - Not a parseable token for this issuer
    pub fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => DomainError::Token(TokenError::InvalidSignature),
                ErrorKind::ExpiredSignature => DomainError::Token(TokenError::Expired),
                _ => DomainError::Token(TokenError::Malformed),
            })?;

        if token_data.claims.is_expired_at(self.clock.now()) {
            return Err(DomainError::Token(TokenError::Expired));
        }

        Ok(token_data.claims)
    }

    /// Verifies an access token and returns its identity
    pub fn verify_access(&self, token: &str) -> Result<Identity, DomainError> {
        self.verify_kind(token, TokenKind::Access)
    }

    /// Verifies a refresh token and returns its identity
    pub fn verify_refresh(&self, token: &str) -> Result<Identity, DomainError> {
        self.verify_kind(token, TokenKind::Refresh)
    }

    fn verify_kind(&self, token: &str, expected: TokenKind) -> Result<Identity, DomainError> {
        let claims = self.verify(token)?;
        if claims.kind != expected {
            return Err(DomainError::Token(TokenError::WrongKind {
                expected: expected.as_str(),
            }));
        }
        Ok(claims.identity())
    }

    /// Exchanges a valid refresh token for a brand-new pair.
    ///
    /// The presented token is not blacklisted; while unexpired it can be
    /// exchanged again.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let identity = self.verify_refresh(refresh_token)?;
        self.issue_pair(&identity)
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }
}
