//! Shared fixtures for the API integration tests

#![allow(dead_code)]

use std::fs;
use std::sync::Arc;

use actix_web::{http::header::AUTHORIZATION, web};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use hl_api::app::AppState;
use hl_api::middleware::AllowList;
use hl_core::domain::entities::Identity;
use hl_core::repositories::InMemoryUserRepository;
use hl_core::services::{
    auth::{AuthService, AuthServiceConfig},
    clock::ManualClock,
    logging::{LogLevel, RotatingLogger},
    token::{TokenService, TokenServiceConfig},
};
use hl_shared::config::{AuthConfig, LoggingConfig};

pub struct TestContext {
    pub dir: TempDir,
    pub clock: Arc<ManualClock>,
    pub logger: Arc<RotatingLogger>,
    pub tokens: Arc<TokenService>,
    pub state: web::Data<AppState<InMemoryUserRepository>>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_allow_list(AllowList::new(&AuthConfig::default().allow_list))
    }

    pub fn with_allow_list(allow_list: AllowList) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()));

        let logger = Arc::new(
            RotatingLogger::new(
                LoggingConfig::new(dir.path().join("logs"))
                    .with_level(LogLevel::Debug)
                    .with_max_file_size(1024 * 1024)
                    .without_console(),
                clock.clone(),
            )
            .unwrap(),
        );

        let tokens = Arc::new(TokenService::new(TokenServiceConfig::default(), clock.clone()));
        let auth_service = Arc::new(AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::clone(&tokens),
            clock.clone(),
            AuthServiceConfig {
                password_hash_cost: 4,
                ..AuthServiceConfig::default()
            },
        ));

        let state = web::Data::new(AppState::new(auth_service, Arc::clone(&logger), allow_list));

        Self {
            dir,
            clock,
            logger,
            tokens,
            state,
        }
    }

    pub fn access_token(&self, user_id: &str, login: &str) -> String {
        self.tokens
            .issue_access_token(&Identity::new(user_id, login))
            .unwrap()
    }

    /// Every line written to the audit log so far, oldest first
    pub fn audit_lines(&self) -> Vec<String> {
        self.logger.flush().unwrap();

        let mut files: Vec<_> = fs::read_dir(self.dir.path().join("logs"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();

        files
            .iter()
            .flat_map(|file| {
                fs::read_to_string(file)
                    .unwrap()
                    .lines()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn count_lines(&self, needle: &str) -> usize {
        self.audit_lines().iter().filter(|line| line.contains(needle)).count()
    }
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token))
}
