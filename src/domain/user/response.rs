//! Public projection of a user account

use serde::{Deserialize, Serialize};

use super::entity::User;

/// User as exposed to callers. Has no password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub login: String,
    pub version: i32,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Epoch milliseconds
    pub updated_at: i64,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            login: user.login().to_string(),
            version: user.version(),
            created_at: user.created_at().timestamp_millis(),
            updated_at: user.updated_at().timestamp_millis(),
        }
    }
}
