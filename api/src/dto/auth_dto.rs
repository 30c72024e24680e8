use hl_core::domain::entities::User;
use hl_shared::errors::error_messages;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Parses a body that must be a JSON object
fn from_json_object<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    match serde_json::from_slice::<Value>(body).ok()? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

/// Body of `POST /auth/signup` and `POST /auth/login`.
///
/// Exactly the two string fields; anything else is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsRequest {
    pub login: String,
    pub password: String,
}

impl CredentialsRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, &'static str> {
        from_json_object(body).ok_or(error_messages::NOT_ALL_FIELDS)
    }
}

/// Body of `POST /auth/refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

impl RefreshTokenRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, &'static str> {
        from_json_object(body).ok_or(error_messages::REFRESH_TOKEN_REQUIRED)
    }
}

/// Public view of a user: everything except the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub login: String,
    pub version: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            login: user.login.clone(),
            version: user.version,
            created_at: user.created_at.timestamp_millis(),
            updated_at: user.updated_at.timestamp_millis(),
        }
    }
}

/// Body of `GET /profile`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    pub login: String,
}
