use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use hl_core::errors::{AuthError, DomainError};
use hl_shared::errors::{error_messages, ErrorResponse};
use thiserror::Error;

/// Error returned by route handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request body failed validation
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{}", error_messages::NOT_FOUND)]
    NotFound,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(error) => domain_error_status(error),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Domain(error) => handle_domain_error(error),
            other => HttpResponse::build(other.status_code()).json(ErrorResponse::new(other.to_string())),
        }
    }
}

/// HTTP status for a domain error
pub fn domain_error_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Auth(AuthError::InvalidCredentials) => StatusCode::FORBIDDEN,
        DomainError::Auth(AuthError::UserAlreadyExists { .. }) => StatusCode::CONFLICT,
        DomainError::Auth(AuthError::UserNotFound) => StatusCode::NOT_FOUND,
        DomainError::Token(_) => StatusCode::UNAUTHORIZED,
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::Internal { .. } | DomainError::Logging(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses.
///
/// Token errors all collapse to the same "Unauthorized" body. Internal
/// details are logged, never returned.
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    let status = domain_error_status(error);

    let message = match error {
        DomainError::Auth(AuthError::InvalidCredentials) => error_messages::INVALID_CREDENTIALS.to_string(),
        DomainError::Auth(AuthError::UserAlreadyExists { .. }) => error_messages::USER_EXISTS.to_string(),
        DomainError::Auth(AuthError::UserNotFound) => error_messages::USER_NOT_FOUND.to_string(),
        DomainError::Token(token_error) => {
            log::debug!("Token rejected: {}", token_error.kind());
            error_messages::UNAUTHORIZED.to_string()
        }
        DomainError::Validation { message } => message.clone(),
        DomainError::Internal { .. } | DomainError::Logging(_) => {
            log::error!("Domain Error: {:?}", error);
            error_messages::INTERNAL_ERROR.to_string()
        }
    };

    HttpResponse::build(status).json(ErrorResponse::new(message))
}

/// The one body ever sent for a server-side failure
pub fn internal_error_response() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse::new(error_messages::INTERNAL_ERROR))
}
