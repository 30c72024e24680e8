//! Error types for the token lifecycle, authentication and audit logging

use std::path::PathBuf;
use thiserror::Error;

/// Token-related errors.
///
/// The variants are kept distinct for the audit log only; at the HTTP
/// boundary every one of them becomes the same "Unauthorized" response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Malformed token")]
    Malformed,

    #[error("Wrong token kind: expected {expected}")]
    WrongKind { expected: &'static str },

    #[error("Token generation failed")]
    GenerationFailed,
}

impl TokenError {
    /// Short machine-readable kind for audit lines
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::InvalidSignature => "INVALID_SIGNATURE",
            TokenError::Expired => "EXPIRED",
            TokenError::Malformed => "MALFORMED",
            TokenError::WrongKind { .. } => "WRONG_KIND",
            TokenError::GenerationFailed => "GENERATION_FAILED",
        }
    }
}

/// Authentication use-case errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid login or password")]
    InvalidCredentials,

    #[error("User already exists: {login}")]
    UserAlreadyExists { login: String },

    #[error("User not found")]
    UserNotFound,
}

/// Audit log I/O errors
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create log folder {}: {source}", path.display())]
    FolderCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
