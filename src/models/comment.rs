//! Comments and the per-user thumb-up ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "commentID")]
    pub id: Uuid,
    pub username: String,
    #[serde(rename = "commentToID")]
    pub post_id: Uuid,
    #[serde(rename = "commentCreatedTime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "numOfThumb")]
    pub num_of_thumb: u64,
    #[serde(rename = "commentContent")]
    pub content: String,
}

/// Body of `POST /comments/:postid`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    #[serde(rename = "commentContent")]
    pub content: String,
}

impl NewComment {
    pub fn validate(&self) -> Option<String> {
        if self.content.trim().is_empty() {
            return Some("commentContent cannot be empty".to_string());
        }
        None
    }
}

impl Comment {
    pub fn create(new: NewComment, post_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            post_id,
            created_at: Utc::now(),
            num_of_thumb: 0,
            content: new.content,
        }
    }
}

/// Records that `username` thumbed up `comment_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThumbupRecord {
    #[serde(rename = "commentID")]
    pub comment_id: Uuid,
    pub username: String,
}

/// Result of a comment thumb-up.
#[derive(Debug, Clone, PartialEq)]
pub enum ThumbupOutcome {
    /// First thumb-up by this user; the counter moved.
    Counted(Comment),
    /// The user had already thumbed this comment up; nothing changed.
    AlreadyCounted(Comment),
}

impl ThumbupOutcome {
    pub fn comment(&self) -> &Comment {
        match self {
            ThumbupOutcome::Counted(c) | ThumbupOutcome::AlreadyCounted(c) => c,
        }
    }
}
