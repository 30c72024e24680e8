//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Access and refresh token issuance
//! - Signature, expiry and kind verification
//! - Stateless refresh into a brand-new pair

mod config;
mod service;


pub use config::TokenServiceConfig;
pub use service::TokenService;
