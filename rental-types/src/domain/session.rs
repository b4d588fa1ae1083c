//! Login session domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{SessionId, UserId};

/// A bearer token issued at login. Only the token hash is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}
