use actix_web::{web, HttpResponse};

use hl_core::repositories::UserRepository;

use crate::app::AppState;
use crate::dto::CredentialsRequest;
use crate::handlers::ApiError;

/// Handler for POST /auth/login
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "accessToken": "eyJ...", "refreshToken": "eyJ..." }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Body is not exactly `{login, password}` strings
/// - 403 Forbidden: Unknown login or wrong password (indistinguishable)
pub async fn login<U>(state: web::Data<AppState<U>>, body: web::Bytes) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
{
    let request = CredentialsRequest::from_slice(&body).map_err(ApiError::BadRequest)?;

    let tokens = state.auth_service.login(&request.login, &request.password).await?;

    Ok(HttpResponse::Ok().json(tokens))
}
