//! Unit tests for AuthService

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{InMemoryUserRepository, UserRepository};
use crate::services::auth::{AuthService, AuthServiceConfig};
use crate::services::clock::ManualClock;
use crate::services::token::{TokenService, TokenServiceConfig};

struct Fixture {
    clock: Arc<ManualClock>,
    repo: Arc<InMemoryUserRepository>,
    tokens: Arc<TokenService>,
    service: AuthService<InMemoryUserRepository>,
}

fn fixture() -> Fixture {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()));
    let repo = Arc::new(InMemoryUserRepository::new());
    let tokens = Arc::new(TokenService::new(TokenServiceConfig::default(), clock.clone()));
    let config = AuthServiceConfig {
        password_hash_cost: 4,
        ..AuthServiceConfig::default()
    };
    let service = AuthService::new(repo.clone(), tokens.clone(), clock.clone(), config);

    Fixture {
        clock,
        repo,
        tokens,
        service,
    }
}

#[tokio::test]
async fn test_signup_stores_hash_not_password() {
    let f = fixture();

    let user = f.service.signup("alice", "s3cret").await.unwrap();

    assert_eq!(user.login, "alice");
    assert_eq!(user.version, 1);
    assert_ne!(user.password_hash, "s3cret");
    assert!(bcrypt::verify("s3cret", &user.password_hash).unwrap());
    assert!(f.repo.find_by_login("alice").await.unwrap().is_some());
}

#[tokio::test]
async fn test_signup_duplicate_login() {
    let f = fixture();
    f.service.signup("alice", "one").await.unwrap();

    let result = f.service.signup("alice", "two").await;

    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::UserAlreadyExists { .. }))
    ));
}

#[tokio::test]
async fn test_signup_disabled() {
    let clock = Arc::new(ManualClock::default());
    let service = AuthService::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(TokenService::new(TokenServiceConfig::default(), clock.clone())),
        clock,
        AuthServiceConfig {
            password_hash_cost: 4,
            allow_registration: false,
        },
    );

    assert!(matches!(
        service.signup("alice", "pw").await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_login_issues_tokens_for_user() {
    let f = fixture();
    let user = f.service.signup("bob", "hunter2").await.unwrap();

    let pair = f.service.login("bob", "hunter2").await.unwrap();

    let identity = f.tokens.verify_access(&pair.access_token).unwrap();
    assert_eq!(identity.user_id, user.id.to_string());
    assert_eq!(identity.login, "bob");
    assert!(f.tokens.verify_refresh(&pair.refresh_token).is_ok());
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_user_fail_alike() {
    let f = fixture();
    f.service.signup("bob", "hunter2").await.unwrap();

    let wrong_password = f.service.login("bob", "hunter3").await;
    let unknown_user = f.service.login("mallory", "hunter2").await;

    assert!(matches!(wrong_password, Err(DomainError::Auth(AuthError::InvalidCredentials))));
    assert!(matches!(unknown_user, Err(DomainError::Auth(AuthError::InvalidCredentials))));
}

#[tokio::test]
async fn test_refresh_delegates_to_token_service() {
    let f = fixture();
    f.service.signup("carol", "pw").await.unwrap();
    let pair = f.service.login("carol", "pw").await.unwrap();

    assert!(f.service.refresh(&pair.refresh_token).is_ok());

    let wrong_kind = f.service.refresh(&pair.access_token).unwrap_err();
    assert!(matches!(wrong_kind.as_token_error(), Some(TokenError::WrongKind { .. })));

    f.clock.advance(Duration::days(2));
    let expired = f.service.refresh(&pair.refresh_token).unwrap_err();
    assert!(matches!(expired.as_token_error(), Some(TokenError::Expired)));
}

#[tokio::test]
async fn test_get_user() {
    let f = fixture();
    let user = f.service.signup("dave", "pw").await.unwrap();

    let found = f.service.get_user(&user.id.to_string()).await.unwrap();
    assert_eq!(found.id, user.id);

    assert!(matches!(
        f.service.get_user("not-a-uuid").await,
        Err(DomainError::Auth(AuthError::UserNotFound))
    ));
}
