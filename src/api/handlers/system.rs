//! Health and cache statistics.

use axum::{extract::State, Json};

use crate::api::AppState;
use crate::models::{HealthResponse, StatsResponse};

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /stats
///
/// Counters of the key-value cache behind the listing and sessions.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.read().await.stats();
    Json(StatsResponse::from(stats))
}
