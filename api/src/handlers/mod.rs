pub mod error;

pub use error::{handle_domain_error, internal_error_response, ApiError};
