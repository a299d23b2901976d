//! Documents and request/response bodies for the blog API

pub mod comment;
pub mod post;
pub mod responses;
pub mod user;

use uuid::Uuid;

use crate::error::{BlogError, Result};

// Re-export commonly used types
pub use comment::{Comment, NewComment, ThumbupOutcome, ThumbupRecord};
pub use post::{NewPost, Post};
pub use responses::{
    DeleteResponse, HealthResponse, MessageResponse, SignInResponse, StatsResponse,
    ThumbupResponse,
};
pub use user::{Credentials, User};

/// Parses a document identifier from a path segment.
pub fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| BlogError::InvalidId(raw.to_string()))
}
