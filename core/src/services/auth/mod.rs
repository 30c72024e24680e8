//! Authentication service module
//!
//! Account signup, credential login and refresh-token exchange on top of
//! the token service.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use service::AuthService;
