use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpRequest, HttpResponse,
};
use futures_util::FutureExt;
use hl_core::services::logging::RotatingLogger;
use std::any::Any;
use std::future::{ready, Ready};
use std::panic::AssertUnwindSafe;
use std::rc::Rc;
use std::sync::Arc;

use crate::handlers::error::internal_error_response;

/// Outermost middleware: turns server-side failures and panics into a
/// generic 500 and makes sure they reach the audit log.
///
/// Client errors (4xx) pass through untouched.
pub struct ErrorBoundary {
    logger: Arc<RotatingLogger>,
}

impl ErrorBoundary {
    pub fn new(logger: Arc<RotatingLogger>) -> Self {
        Self { logger }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorBoundary
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorBoundaryService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorBoundaryService {
            service: Rc::new(service),
            logger: Arc::clone(&self.logger),
        }))
    }
}

pub struct ErrorBoundaryService<S> {
    service: Rc<S>,
    logger: Arc<RotatingLogger>,
}

impl<S, B> Service<ServiceRequest> for ErrorBoundaryService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let logger = Arc::clone(&self.logger);
        // Kept for building a response when the request itself is lost to
        // an error or a panic
        let http_req = req.request().clone();

        Box::pin(async move {
            let outcome = AssertUnwindSafe(service.call(req)).catch_unwind().await;

            match outcome {
                Ok(Ok(response)) => {
                    let failure = response
                        .response()
                        .error()
                        .filter(|_| response.status().is_server_error())
                        .map(|e| format!("{:?}", e));

                    match failure {
                        Some(detail) => {
                            report(&logger, &http_req, &detail);
                            let (req, _) = response.into_parts();
                            Ok(ServiceResponse::new(req, internal_error_response()).map_into_right_body())
                        }
                        None => Ok(response.map_into_left_body()),
                    }
                }
                Ok(Err(error)) => {
                    let status = error.as_response_error().status_code();
                    let response = if status.is_server_error() {
                        report(&logger, &http_req, &format!("{:?}", error));
                        internal_error_response()
                    } else {
                        HttpResponse::from_error(error)
                    };
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
                Err(panic) => {
                    report(&logger, &http_req, &format!("panic: {}", panic_message(&*panic)));
                    Ok(ServiceResponse::new(http_req, internal_error_response()).map_into_right_body())
                }
            }
        })
    }
}

fn report(logger: &RotatingLogger, req: &HttpRequest, detail: &str) {
    log::error!("Unhandled error on {} {}: {}", req.method(), req.path(), detail);
    logger.error(&format!(
        "HTTP 500 Error: {} {} {}",
        req.method(),
        req.path(),
        detail
    ));
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
