//! User domain model and the authenticated caller identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::id::UserId;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: UserId,
    /// Unique login name
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Salted password hash, never sent over the wire
    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub password_hash: String,
    #[schema(example = "+48123456789")]
    pub phone: String,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub created_at: DateTime<Utc>,
}

/// Data needed to insert a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
}

/// The authenticated identity behind a request.
///
/// Resolved once by the inbound adapter and passed explicitly to every
/// service call that acts on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub username: String,
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: UserId::new(1),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "salt$hash".into(),
            phone: "123".into(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(Caller::from(&user).user_id, UserId::new(1));
    }
}
