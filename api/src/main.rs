use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use hl_api::app::{create_app, AppState};
use hl_api::middleware::AllowList;
use hl_core::repositories::InMemoryUserRepository;
use hl_core::services::{
    auth::{AuthService, AuthServiceConfig},
    clock::{Clock, SystemClock},
    logging::RotatingLogger,
    token::{TokenService, TokenServiceConfig},
};
use hl_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize operational logging; `log` records are bridged into tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Home Library API Server");

    let config = AppConfig::from_env();
    if config.environment.is_production() && config.auth.jwt.is_using_default_secret() {
        warn!("JWT_SECRET is not set; tokens are signed with the built-in development secret");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let logger = Arc::new(
        RotatingLogger::new(config.logging.clone(), Arc::clone(&clock))
            .context("Failed to initialize the audit log")?,
    );
    info!(
        "Audit log at {} (level {}, rotate at {} bytes)",
        logger.folder().display(),
        logger.min_level(),
        config.logging.max_file_size
    );

    let token_service = Arc::new(TokenService::new(
        TokenServiceConfig::from(&config.auth.jwt),
        Arc::clone(&clock),
    ));
    let auth_service = Arc::new(AuthService::new(
        Arc::new(InMemoryUserRepository::new()),
        token_service,
        clock,
        AuthServiceConfig::from(&config.auth),
    ));

    let app_state = web::Data::new(
        AppState::new(
            auth_service,
            Arc::clone(&logger),
            AllowList::new(&config.auth.allow_list),
        )
        .with_body_limit(config.server.max_body_size),
    );

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    HttpServer::new(move || create_app(app_state.clone()))
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("Server terminated with an error")?;

    logger.shutdown();
    Ok(())
}
