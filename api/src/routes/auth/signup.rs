use actix_web::{web, HttpResponse};

use hl_core::repositories::UserRepository;

use crate::app::AppState;
use crate::dto::{CredentialsRequest, UserResponse};
use crate::handlers::ApiError;

/// Handler for POST /auth/signup
///
/// # Request Body
///
/// ```json
/// { "login": "string", "password": "string" }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// { "id": "uuid", "login": "string", "version": 1, "createdAt": 0, "updatedAt": 0 }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Body is not exactly `{login, password}` strings
/// - 409 Conflict: Login already taken
pub async fn signup<U>(state: web::Data<AppState<U>>, body: web::Bytes) -> Result<HttpResponse, ApiError>
where
    U: UserRepository + 'static,
{
    let request = CredentialsRequest::from_slice(&body).map_err(ApiError::BadRequest)?;

    let user = state.auth_service.signup(&request.login, &request.password).await?;

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}
