//! API Handlers
//!
//! HTTP request handlers, grouped by collection.

pub mod auth;
pub mod comments;
pub mod posts;
pub mod system;
