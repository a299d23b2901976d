//! Session gate for write routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::api::AppState;
use crate::auth::session::SESSION_COOKIE;
use crate::error::BlogError;

/// Middleware that requires a live session cookie.
///
/// On success the resolved [`Session`](crate::auth::Session) is stored in
/// the request extensions for handlers to extract. Otherwise the request is
/// rejected with `403 {"error": "not signed in"}`.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, BlogError> {
    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        tracing::debug!("missing session cookie");
        return Err(BlogError::Forbidden);
    };

    let Some(session) = state.sessions.lookup(&token).await else {
        tracing::debug!("unknown or expired session");
        return Err(BlogError::Forbidden);
    };

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
