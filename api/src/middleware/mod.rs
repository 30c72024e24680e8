pub mod auth;
pub mod error_handler;
pub mod request_log;

pub use auth::{AllowList, AuthContext, GateError, GateKeeper, OptionalAuth};
pub use error_handler::ErrorBoundary;
