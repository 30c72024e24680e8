//! Main authentication service implementation

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::{TokenPair, User};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::UserRepository;
use crate::services::clock::Clock;
use crate::services::token::TokenService;

use super::config::AuthServiceConfig;

/// Authentication service for account creation and token issuance
pub struct AuthService<U>
where
    U: UserRepository,
{
    /// User repository for persistence
    user_repository: Arc<U>,
    /// Token service for JWT management
    token_service: Arc<TokenService>,
    /// Time source for entity timestamps
    clock: Arc<dyn Clock>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<U> AuthService<U>
where
    U: UserRepository,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `user_repository` - Repository for user data persistence
    /// * `token_service` - Service for JWT token management
    /// * `clock` - Time source for `createdAt` / `updatedAt`
    /// * `config` - Service configuration
    pub fn new(
        user_repository: Arc<U>,
        token_service: Arc<TokenService>,
        clock: Arc<dyn Clock>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            user_repository,
            token_service,
            clock,
            config,
        }
    }

    /// Register a new account
    ///
    /// The password is stored only as a bcrypt hash.
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The created user
    /// * `Err(DomainError::Auth(AuthError::UserAlreadyExists))` - Login taken
    pub async fn signup(&self, login: &str, password: &str) -> DomainResult<User> {
        if !self.config.allow_registration {
            return Err(DomainError::Validation {
                message: "Registration is disabled".to_string(),
            });
        }

        if self.user_repository.exists_by_login(login).await? {
            return Err(AuthError::UserAlreadyExists {
                login: login.to_string(),
            }
            .into());
        }

        let password_hash = self.hash_password(password).await?;
        let user = User::new(login, password_hash, self.clock.now());
        let user = self.user_repository.create(user).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Exchange login and password for a token pair
    ///
    /// Unknown logins and wrong passwords fail the same way.
    pub async fn login(&self, login: &str, password: &str) -> DomainResult<TokenPair> {
        let user = match self.user_repository.find_by_login(login).await? {
            Some(user) => user,
            None => {
                tracing::debug!("Login attempt for unknown user");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = self.token_service.issue_pair(&user.identity())?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(tokens)
    }

    /// Exchange a refresh token for a fresh pair
    pub fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        self.token_service.refresh(refresh_token)
    }

    /// Look up the account behind an authenticated identity
    pub async fn get_user(&self, user_id: &str) -> DomainResult<User> {
        let id = Uuid::parse_str(user_id).map_err(|_| AuthError::UserNotFound)?;
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound.into())
    }

    pub fn token_service(&self) -> &Arc<TokenService> {
        &self.token_service
    }

    async fn hash_password(&self, password: &str) -> DomainResult<String> {
        let password = password.to_string();
        let cost = self.config.password_hash_cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Password hashing task failed: {}", e),
            })?
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to hash password: {}", e),
            })
    }

    async fn verify_password(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Password verification task failed: {}", e),
            })?
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to verify password: {}", e),
            })
    }
}
