//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(rename = "userID")]
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(rename = "userCreatedTime")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Body of `/signin` and `/signup`.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Option<String> {
        if self.username.trim().is_empty() {
            return Some("username cannot be empty".to_string());
        }
        if self.password.is_empty() {
            return Some("password cannot be empty".to_string());
        }
        None
    }
}
