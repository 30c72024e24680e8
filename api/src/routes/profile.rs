use actix_web::HttpResponse;

use crate::dto::ProfileResponse;
use crate::middleware::AuthContext;

/// Handler for GET /profile
///
/// Echoes the identity the gatekeeper attached to the request.
pub async fn profile(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(ProfileResponse {
        user_id: auth.user_id,
        login: auth.login,
    })
}
