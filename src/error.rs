//! Error types for the blog backend
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Blog Error Enum ==
/// Unified error type for the blog backend.
#[derive(Error, Debug)]
pub enum BlogError {
    /// Document not found in the store
    #[error("{0} not found")]
    NotFound(String),

    /// Path segment is not a valid document identifier
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Invalid request data
    #[error("{0}")]
    BadRequest(String),

    /// Wrong username or password
    #[error("Invalid username or password")]
    Unauthorized,

    /// No live session for a gated route
    #[error("not signed in")]
    Forbidden,

    /// Unique constraint violated
    #[error("{0}")]
    Conflict(String),

    /// Cache engine rejected an operation
    #[error("cache error: {0}")]
    Cache(String),

    /// Document store failure
    #[error("database error: {0}")]
    Database(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BlogError {
    /// HTTP status this error is rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::InvalidId(_) | BlogError::BadRequest(_) | BlogError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            BlogError::Unauthorized => StatusCode::UNAUTHORIZED,
            BlogError::Forbidden => StatusCode::FORBIDDEN,
            BlogError::Cache(_) | BlogError::Database(_) | BlogError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<serde_json::Error> for BlogError {
    fn from(err: serde_json::Error) -> Self {
        BlogError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for BlogError {
    fn from(err: sqlx::Error) -> Self {
        BlogError::Database(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string()
        }));

        (self.status(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the blog backend.
pub type Result<T> = std::result::Result<T, BlogError>;
