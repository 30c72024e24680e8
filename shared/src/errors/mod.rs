//! Shared error response structure

use serde::{Deserialize, Serialize};

/// Error body returned by every endpoint: `{ "error": "<message>" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Messages shown to clients. None of them reveal which credential check failed.
pub mod error_messages {
    pub const MISSING_AUTH_HEADER: &str = "Missing Authorization header";
    pub const INVALID_AUTH_HEADER: &str = "Invalid Authorization header";
    pub const UNAUTHORIZED: &str = "Unauthorized";
    pub const PAYLOAD_TOO_LARGE: &str = "Request body is too large";
    pub const INVALID_CREDENTIALS: &str = "Incorrect login or password";
    pub const USER_EXISTS: &str = "User with this login already exists";
    pub const USER_NOT_FOUND: &str = "User not found";
    pub const NOT_ALL_FIELDS: &str = "Body must contain exactly the string fields login and password";
    pub const REFRESH_TOKEN_REQUIRED: &str = "Body must contain the string field refreshToken";
    pub const NOT_FOUND: &str = "The requested resource was not found";
    pub const INTERNAL_ERROR: &str = "Internal server error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let body = serde_json::to_value(ErrorResponse::new("Unauthorized")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Unauthorized" }));
    }
}
