//! User entity: the account a token's identity is issued for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::token::Identity;

/// Registered user.
///
/// Serializes without the password hash and with epoch-millisecond
/// timestamps, which is the shape returned by the signup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login name, unique across users
    pub login: String,

    /// bcrypt hash of the password
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Incremented on every update
    pub version: u32,

    /// Timestamp when the user was created
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new User instance
    pub fn new(login: impl Into<String>, password_hash: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            login: login.into(),
            password_hash: password_hash.into(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// The identity carried by tokens issued for this user
    pub fn identity(&self) -> Identity {
        Identity::new(self.id.to_string(), self.login.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_user() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let user = User::new("alice", "$2b$hash", now);

        assert_eq!(user.login, "alice");
        assert_eq!(user.version, 1);
        assert_eq!(user.created_at, now);
        assert_eq!(user.updated_at, now);
    }

    #[test]
    fn test_serialization_hides_password() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let user = User::new("alice", "$2b$hash", now);

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["login"], "alice");
        assert_eq!(json["createdAt"], now.timestamp_millis());
    }

    #[test]
    fn test_identity() {
        let user = User::new("bob", "hash", Utc::now());
        let identity = user.identity();

        assert_eq!(identity.user_id, user.id.to_string());
        assert_eq!(identity.login, "bob");
    }
}
