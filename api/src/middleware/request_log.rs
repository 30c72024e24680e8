//! Audit lines written by the gatekeeper for every request.

use std::sync::Arc;

use actix_web::http::StatusCode;
use hl_core::services::logging::RotatingLogger;
use serde_json::Value;

/// JSON fields whose values never reach the audit log
const REDACTED_FIELDS: [&str; 3] = ["password", "oldPassword", "newPassword"];
const REDACTED: &str = "***";
const TRUNCATED: &str = "<truncated>";

/// `Request: <METHOD> <path> query=<query> body=<body>`
///
/// `body` is `None` when the body was not read in full (over the size limit
/// or a broken payload).
pub fn intake_line(method: &str, path: &str, query: &str, body: Option<&[u8]>) -> String {
    format!(
        "Request: {} {} query={} body={}",
        method,
        path,
        query,
        body.map_or_else(|| TRUNCATED.to_string(), render_body)
    )
}

/// `Response: <METHOD> <path> status=<code>`
pub fn outtake_line(method: &str, path: &str, status: StatusCode) -> String {
    format!("Response: {} {} status={}", method, path, status.as_u16())
}

/// Renders a request body for the intake line.
///
/// JSON is re-serialized compactly with credential fields masked; an empty
/// body renders as `{}` and anything that is not JSON only by its size.
pub fn render_body(body: &[u8]) -> String {
    if body.is_empty() {
        return "{}".to_string();
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(mut value) => {
            redact(&mut value);
            value.to_string()
        }
        Err(_) => format!("<{} bytes>", body.len()),
    }
}

fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = Value::String(REDACTED.to_string());
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// Writes the outtake line when dropped.
///
/// Created at intake, so every way out of the request (forwarded, rejected,
/// failed downstream, unwound by a panic) produces exactly one line. A
/// request that never recorded a status is logged as 500.
pub struct OuttakeGuard {
    logger: Arc<RotatingLogger>,
    method: String,
    path: String,
    status: Option<StatusCode>,
}

impl OuttakeGuard {
    pub fn new(logger: Arc<RotatingLogger>, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            logger,
            method: method.into(),
            path: path.into(),
            status: None,
        }
    }

    pub fn record(&mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl Drop for OuttakeGuard {
    fn drop(&mut self) {
        let status = self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.logger
            .info(&outtake_line(&self.method, &self.path, status));
    }
}
