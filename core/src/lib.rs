//! # Home Library Core
//!
//! Domain layer for the Home Library backend: token lifecycle, account
//! authentication, the audit log writer, repository interfaces and the
//! error types shared by all of them.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{Claims, Identity, TokenKind, TokenPair, User};
pub use errors::{AuthError, DomainError, DomainResult, LoggingError, TokenError};
pub use repositories::{InMemoryUserRepository, UserRepository};
pub use services::{
    AuthService, AuthServiceConfig, Clock, LogLevel, ManualClock, RotatingLogger, SystemClock,
    TokenService, TokenServiceConfig,
};
