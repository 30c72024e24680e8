use actix_web::{web, HttpResponse};

use hl_core::errors::{DomainError, TokenError};
use hl_core::repositories::UserRepository;

use crate::app::AppState;
use crate::dto::RefreshTokenRequest;
use crate::handlers::ApiError;

/// Handler for POST /auth/refresh
///
/// Exchanges a refresh token for a new pair. The presented token stays
/// valid until it expires.
///
/// # Request Body
///
/// ```json
/// { "refreshToken": "eyJ..." }
/// ```
///
/// ## Errors
/// - 400 Bad Request: No string `refreshToken` in the body
/// - 401 Unauthorized: Token invalid, expired, or an access token
pub async fn refresh<U>(state: web::Data<AppState<U>>, body: web::Bytes) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
{
    let request = RefreshTokenRequest::from_slice(&body).map_err(ApiError::BadRequest)?;

    match state.auth_service.refresh(&request.refresh_token) {
        Ok(tokens) => Ok(HttpResponse::Ok().json(tokens)),
        Err(DomainError::Token(error)) => Err(DomainError::Token(error).into()),
        Err(other) => {
            log::warn!("Refresh failed: {}", other);
            Err(DomainError::Token(TokenError::GenerationFailed).into())
        }
    }
}
