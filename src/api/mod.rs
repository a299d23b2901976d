//! API Module
//!
//! HTTP handlers and routing for the blog REST API.

pub mod handlers;
pub mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
