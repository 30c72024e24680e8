//! Request gatekeeping middleware.
//!
//! Every request passes through the same sequence: the intake line is
//! written to the audit log, allow-listed paths skip straight to the
//! handler, everything else must carry `Authorization: Bearer <token>`
//! with a valid access token. On success the caller's identity is attached
//! to the request as [`AuthContext`]. Bodies larger than the configured limit
//! are refused with 413 before anything else is checked. An outtake line with the final status
//! is written exactly once however the request ends.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::PayloadError,
    http::{
        header::{HeaderValue, AUTHORIZATION, CONTENT_LENGTH},
        StatusCode,
    },
    web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
};
use futures_util::{future::LocalBoxFuture, StreamExt};
use hl_core::{
    domain::entities::Identity,
    errors::{DomainError, TokenError},
    services::{logging::RotatingLogger, token::TokenService},
};
use hl_shared::config::DEFAULT_MAX_BODY_SIZE;
use hl_shared::errors::{error_messages, ErrorResponse};
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};
use thiserror::Error;

use super::request_log::{intake_line, OuttakeGuard};

/// Caller identity attached to gated requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// User ID from the token's `sub` claim
    pub user_id: String,
    /// Login from the token
    pub login: String,
}

impl From<Identity> for AuthContext {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            login: identity.login,
        }
    }
}

/// Why a request was stopped at the gate
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("{}", error_messages::MISSING_AUTH_HEADER)]
    MissingHeader,

    #[error("{}", error_messages::INVALID_AUTH_HEADER)]
    MalformedHeader,

    #[error("{}", error_messages::PAYLOAD_TOO_LARGE)]
    PayloadTooLarge,

    /// The token failed verification. The cause is kept for the audit log
    /// and never shown to the client.
    #[error("{}", error_messages::UNAUTHORIZED)]
    Unauthorized(TokenError),
}

impl GateError {
    /// Short machine-readable reason for audit lines
    pub fn kind(&self) -> &'static str {
        match self {
            GateError::MissingHeader => "MISSING_HEADER",
            GateError::MalformedHeader => "MALFORMED_HEADER",
            GateError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            GateError::Unauthorized(token_error) => token_error.kind(),
        }
    }
}

impl ResponseError for GateError {
    fn status_code(&self) -> StatusCode {
        match self {
            GateError::MissingHeader | GateError::MalformedHeader => StatusCode::BAD_REQUEST,
            GateError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GateError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}

/// Path prefixes that bypass token checks.
///
/// A prefix matches the path itself and anything below it (`/doc` matches
/// `/doc` and `/doc/openapi`, not `/documents`).
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    prefixes: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().trim().trim_end_matches('/').to_string())
                .collect(),
        }
    }

    pub fn is_allowed(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .map_or(false, |rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

/// Gatekeeping middleware factory
pub struct GateKeeper {
    token_service: Arc<TokenService>,
    logger: Arc<RotatingLogger>,
    allow_list: Arc<AllowList>,
    body_limit: usize,
}

impl GateKeeper {
    pub fn new(token_service: Arc<TokenService>, logger: Arc<RotatingLogger>, allow_list: AllowList) -> Self {
        Self {
            token_service,
            logger,
            allow_list: Arc::new(allow_list),
            body_limit: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Largest body buffered at intake, in bytes
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for GateKeeper
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = GateKeeperMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GateKeeperMiddleware {
            service: Rc::new(service),
            token_service: Arc::clone(&self.token_service),
            logger: Arc::clone(&self.logger),
            allow_list: Arc::clone(&self.allow_list),
            body_limit: self.body_limit,
        }))
    }
}

/// Gatekeeping middleware service
pub struct GateKeeperMiddleware<S> {
    service: Rc<S>,
    token_service: Arc<TokenService>,
    logger: Arc<RotatingLogger>,
    allow_list: Arc<AllowList>,
    body_limit: usize,
}

impl<S, B> Service<ServiceRequest> for GateKeeperMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let token_service = Arc::clone(&self.token_service);
        let logger = Arc::clone(&self.logger);
        let allow_list = Arc::clone(&self.allow_list);
        let body_limit = self.body_limit;

        Box::pin(async move {
            let method = req.method().to_string();
            let path = req.path().to_string();
            let mut outtake = OuttakeGuard::new(Arc::clone(&logger), method.as_str(), path.as_str());

            // Intake
            let body = match buffer_body(&mut req, body_limit).await {
                Ok(body) => body,
                Err(e) => {
                    logger.info(&intake_line(&method, &path, req.query_string(), None));
                    let error: Error = e.into();
                    outtake.record(error.as_response_error().status_code());
                    return Err(error);
                }
            };
            logger.info(&intake_line(&method, &path, req.query_string(), body.as_deref()));
            if body.is_none() {
                return Ok(reject(req, GateError::PayloadTooLarge, &logger, &mut outtake));
            }

            // Allow-list, header check, verification
            if !allow_list.is_allowed(&path) {
                match authenticate(req.headers().get(AUTHORIZATION), &token_service) {
                    Ok(context) => {
                        req.extensions_mut().insert(context);
                    }
                    Err(gate_error) => {
                        return Ok(reject(req, gate_error, &logger, &mut outtake));
                    }
                }
            }

            // Forward
            match service.call(req).await {
                Ok(response) => {
                    outtake.record(response.status());
                    Ok(response.map_into_left_body())
                }
                Err(error) => {
                    outtake.record(error.as_response_error().status_code());
                    Err(error)
                }
            }
        })
    }
}

/// Answers a request stopped at the gate and logs the reason
fn reject<B>(
    req: ServiceRequest,
    gate_error: GateError,
    logger: &RotatingLogger,
    outtake: &mut OuttakeGuard,
) -> ServiceResponse<EitherBody<B>> {
    logger.warn(&format!(
        "Rejected: {} {} reason={}",
        req.method(),
        req.path(),
        gate_error.kind()
    ));
    let response = req.error_response(gate_error);
    outtake.record(response.status());
    response.map_into_right_body()
}

/// Reads the request body and puts it back so extractors still see it.
///
/// Returns `Ok(None)` once the body is known to exceed `limit`, either from
/// `Content-Length` or while reading; nothing past the limit is buffered.
async fn buffer_body(req: &mut ServiceRequest, limit: usize) -> Result<Option<web::Bytes>, PayloadError> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared.map_or(false, |length| length > limit) {
        return Ok(None);
    }

    let mut payload = req.take_payload();
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > limit {
            return Ok(None);
        }
        body.extend_from_slice(&chunk);
    }

    let body = body.freeze();
    req.set_payload(bytes_to_payload(body.clone()));
    Ok(Some(body))
}

fn bytes_to_payload(body: web::Bytes) -> Payload {
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(body);
    Payload::from(payload)
}

/// Checks the header and verifies the access token
fn authenticate(header: Option<&HeaderValue>, token_service: &TokenService) -> Result<AuthContext, GateError> {
    let token = extract_bearer_token(header)?;

    token_service
        .verify_access(token)
        .map(AuthContext::from)
        .map_err(|e| match e {
            DomainError::Token(token_error) => GateError::Unauthorized(token_error),
            _ => GateError::Unauthorized(TokenError::Malformed),
        })
}

/// Extracts the token from `Bearer <token>`.
///
/// The scheme is case-sensitive and the value must be exactly two
/// whitespace-separated parts.
fn extract_bearer_token(header: Option<&HeaderValue>) -> Result<&str, GateError> {
    let value = header
        .ok_or(GateError::MissingHeader)?
        .to_str()
        .map_err(|_| GateError::MalformedHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(GateError::MalformedHeader),
    }
}

/// Extractor for the authenticated caller
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| GateError::Unauthorized(TokenError::Malformed).into());

        ready(result)
    }
}

/// Extractor for routes that work with or without a caller
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequest for OptionalAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let auth = req.extensions().get::<AuthContext>().cloned();
        ready(Ok(OptionalAuth(auth)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let value = header("Bearer test_token_123");
        assert_eq!(extract_bearer_token(Some(&value)), Ok("test_token_123"));

        assert_eq!(extract_bearer_token(None), Err(GateError::MissingHeader));
    }

    #[test]
    fn test_malformed_headers() {
        for raw in ["test_token_123", "Bearer", "Bearer ", "bearer abc", "Basic abc", "Bearer a b"] {
            let value = header(raw);
            assert_eq!(
                extract_bearer_token(Some(&value)),
                Err(GateError::MalformedHeader),
                "header {:?}",
                raw
            );
        }

        let opaque = HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap();
        assert_eq!(extract_bearer_token(Some(&opaque)), Err(GateError::MalformedHeader));
    }

    #[test]
    fn test_allow_list_matches_segments() {
        let list = AllowList::new(["/auth/login", "/doc/"]);

        assert!(list.is_allowed("/auth/login"));
        assert!(list.is_allowed("/doc"));
        assert!(list.is_allowed("/doc/openapi.json"));
        assert!(!list.is_allowed("/auth/loginx"));
        assert!(!list.is_allowed("/documents"));
        assert!(!list.is_allowed("/profile"));
    }

    #[test]
    fn test_empty_allow_list_allows_nothing() {
        let list = AllowList::new(Vec::<String>::new());
        assert!(!list.is_allowed("/"));
        assert!(!list.is_allowed("/auth/login"));
    }

    #[test]
    fn test_gate_error_statuses_and_bodies() {
        assert_eq!(GateError::MissingHeader.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(GateError::MalformedHeader.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(GateError::PayloadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            GateError::Unauthorized(TokenError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );

        assert_eq!(
            GateError::Unauthorized(TokenError::Expired).to_string(),
            GateError::Unauthorized(TokenError::InvalidSignature).to_string()
        );
        assert_eq!(GateError::Unauthorized(TokenError::Expired).kind(), "EXPIRED");
    }
}
