//! User repository trait defining the interface for user persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// Implementations own the storage; the auth service only sees this
/// contract. Logins are unique: `create` must reject a second user with a
/// login that is already taken.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with the given ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by login name (exact match)
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DomainError::Auth(AuthError::UserAlreadyExists))` - Login taken
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Replace an existing user
    ///
    /// # Returns
    /// * `Err(DomainError::Auth(AuthError::UserNotFound))` - No such user
    async fn update(&self, user: User) -> Result<User, DomainError>;

    /// Delete a user, returning whether one was removed
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Check whether a login is already registered
    async fn exists_by_login(&self, login: &str) -> Result<bool, DomainError> {
        Ok(self.find_by_login(login).await?.is_some())
    }
}
