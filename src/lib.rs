//! Blogo - a small blogging backend
//!
//! Posts, comments and accounts over a pluggable document store, with
//! cache-backed sessions and a cache-aside post listing.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
