//! Shared configuration and wire types for the Home Library server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types built once at startup
//! - The audit log severity level
//! - The JSON error body returned to clients

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{AppConfig, AuthConfig, Environment, JwtConfig, LoggingConfig, ServerConfig};
pub use errors::{error_messages, ErrorResponse};
pub use types::LogLevel;
