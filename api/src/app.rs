//! Application state and factory
//!
//! This module handles the initialization of the application state
//! and provides the factory for creating the Actix-web application.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::Logger,
    web, App, Error, HttpResponse,
};

use hl_core::repositories::UserRepository;
use hl_core::services::{auth::AuthService, logging::RotatingLogger, token::TokenService};
use hl_shared::config::DEFAULT_MAX_BODY_SIZE;

use crate::handlers::ApiError;
use crate::middleware::{AllowList, ErrorBoundary, GateKeeper};
use crate::routes::{
    auth::{login, refresh, signup},
    profile::profile,
};

/// Shared services handed to every worker
pub struct AppState<U>
where
    U: UserRepository,
{
    pub auth_service: Arc<AuthService<U>>,
    pub token_service: Arc<TokenService>,
    pub logger: Arc<RotatingLogger>,
    pub allow_list: AllowList,
    /// Largest request body the gatekeeper accepts, in bytes
    pub body_limit: usize,
}

impl<U> AppState<U>
where
    U: UserRepository,
{
    pub fn new(
        auth_service: Arc<AuthService<U>>,
        logger: Arc<RotatingLogger>,
        allow_list: AllowList,
    ) -> Self {
        Self {
            token_service: Arc::clone(auth_service.token_service()),
            auth_service,
            logger,
            allow_list,
            body_limit: DEFAULT_MAX_BODY_SIZE,
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

/// Create and configure the application with all dependencies
///
/// Middleware order, outermost first: error boundary, access log,
/// gatekeeper, then routing.
pub fn create_app<U>(
    app_state: web::Data<AppState<U>>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
{
    let gatekeeper = GateKeeper::new(
        Arc::clone(&app_state.token_service),
        Arc::clone(&app_state.logger),
        app_state.allow_list.clone(),
    )
    .with_body_limit(app_state.body_limit);
    let boundary = ErrorBoundary::new(Arc::clone(&app_state.logger));

    let payload_config = web::PayloadConfig::new(app_state.body_limit);

    App::new()
        .app_data(payload_config)
        .app_data(app_state)
        .wrap(gatekeeper)
        .wrap(Logger::default())
        .wrap(boundary)
        .service(
            web::scope("/auth")
                .route("/signup", web::post().to(signup::<U>))
                .route("/login", web::post().to(login::<U>))
                .route("/refresh", web::post().to(refresh::<U>)),
        )
        .route("/profile", web::get().to(profile))
        .route("/health", web::get().to(health_check))
        .route("/doc", web::get().to(api_documentation))
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "home-library-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// API documentation endpoint
async fn api_documentation() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Home Library API",
        "authentication": "Authorization: Bearer <accessToken> on every route not listed as public",
        "endpoints": {
            "health": { "path": "/health", "method": "GET", "public": true },
            "doc": { "path": "/doc", "method": "GET", "public": true },
            "signup": {
                "path": "/auth/signup",
                "method": "POST",
                "public": true,
                "request_body": { "login": "string", "password": "string" },
                "responses": {
                    "201": "User created (password never returned)",
                    "400": "Body is not exactly login and password strings",
                    "409": "Login already taken"
                }
            },
            "login": {
                "path": "/auth/login",
                "method": "POST",
                "public": true,
                "request_body": { "login": "string", "password": "string" },
                "responses": {
                    "200": "{ accessToken, refreshToken }",
                    "400": "Body is not exactly login and password strings",
                    "403": "Incorrect login or password"
                }
            },
            "refresh": {
                "path": "/auth/refresh",
                "method": "POST",
                "public": true,
                "request_body": { "refreshToken": "string" },
                "responses": {
                    "200": "{ accessToken, refreshToken }",
                    "400": "Missing refreshToken",
                    "401": "Refresh token invalid or expired"
                }
            },
            "profile": {
                "path": "/profile",
                "method": "GET",
                "public": false,
                "responses": {
                    "200": "{ userId, login }",
                    "400": "Missing or malformed Authorization header",
                    "401": "Unauthorized"
                }
            }
        }
    }))
}

/// 404 Not Found handler
async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound)
}
