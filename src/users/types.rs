//! User identity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum username length.
pub const USERNAME_MIN_LEN: usize = 3;
/// Maximum username length.
pub const USERNAME_MAX_LEN: usize = 30;

/// A registered user. Only `display_name` changes after registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record with a fresh id.
    pub fn new(email: String, username: String, display_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            display_name,
            created_at: Utc::now(),
        }
    }

    /// The fields other users may see.
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
}

/// Check the username shape: 3-30 chars of `[A-Za-z0-9_]`.
pub fn is_valid_username(username: &str) -> bool {
    (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
