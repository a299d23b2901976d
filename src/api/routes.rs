//! API Routes
//!
//! Configures the Axum router with all blog endpoints.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{auth, comments, posts, system};
use super::AppState;
use crate::auth::require_session;

/// Creates the main router with all endpoints configured.
///
/// # Public
/// - `POST /signup`, `POST /signin`, `POST /signout`
/// - `GET /posts`, `GET /posts/:id`, `GET /posts/search/:title`, `GET /random-post`
/// - `GET /comments/:postid`, `GET /comments/by/:username`,
///   `GET /comments/thumbupedby/:username`
/// - `GET /health`, `GET /stats`
///
/// # Session required
/// - `POST /posts`, `DELETE /posts/:id`, `POST /posts/thumbup/:id`
/// - `POST /comments/:postid`, `POST /comments/thumbup/:commentid`
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/signup", post(auth::sign_up))
        .route("/signin", post(auth::sign_in))
        .route("/signout", post(auth::sign_out))
        .route("/posts", get(posts::list_posts))
        .route("/posts/:id", get(posts::view_post))
        .route("/posts/search/:title", get(posts::search_posts))
        .route("/random-post", get(posts::random_post))
        .route("/comments/:postid", get(comments::list_comments))
        .route("/comments/by/:username", get(comments::comments_by_user))
        .route(
            "/comments/thumbupedby/:username",
            get(comments::thumbed_up_by_user),
        )
        .route("/health", get(system::health_handler))
        .route("/stats", get(system::stats_handler));

    let gated = Router::new()
        .route("/posts", post(posts::create_post))
        .route("/posts/:id", delete(posts::delete_post))
        .route("/posts/thumbup/:id", post(posts::thumbup_post))
        .route("/comments/:postid", post(comments::create_comment))
        .route(
            "/comments/thumbup/:commentid",
            post(comments::thumbup_comment),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .merge(public)
        .merge(gated)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for the configured front-end origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .expose_headers([header::SET_COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}
