//! Post handlers.
//!
//! Every successful write to the posts collection drops the cached listing
//! so the next `GET /posts` reloads from the store.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::info;

use crate::api::AppState;
use crate::auth::Session;
use crate::cache::aside::{get_or_load, invalidate, POSTS_CACHE_KEY};
use crate::error::{BlogError, Result};
use crate::models::{parse_id, DeleteResponse, NewPost, Post, ThumbupResponse};

/// Handler for GET /posts
///
/// Served from the cache when a listing is cached, otherwise loaded from
/// the store and cached for the configured TTL.
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>> {
    let store = state.store.clone();
    let posts = get_or_load(
        &state.cache,
        POSTS_CACHE_KEY,
        state.posts_cache_ttl(),
        || async move { store.list_posts().await },
    )
    .await?;

    Ok(Json(posts))
}

/// Handler for GET /posts/:id
pub async fn view_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>> {
    let id = parse_id(&id)?;

    state
        .store
        .get_post(id)
        .await?
        .map(Json)
        .ok_or_else(|| BlogError::NotFound("post".to_string()))
}

/// Handler for GET /posts/search/:title
///
/// Exact title match; no match yields an empty list.
pub async fn search_posts(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Vec<Post>>> {
    Ok(Json(state.store.find_posts_by_title(&title).await?))
}

/// Handler for GET /random-post
///
/// Returns `null` when there are no posts.
pub async fn random_post(State(state): State<AppState>) -> Result<Json<Option<Post>>> {
    Ok(Json(state.store.random_post().await?))
}

/// Handler for POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(new): Json<NewPost>,
) -> Result<Json<Post>> {
    if let Some(error_msg) = new.validate() {
        return Err(BlogError::BadRequest(error_msg));
    }

    let post = Post::create(new, session.username);
    state.store.insert_post(post.clone()).await?;
    invalidate(&state.cache, POSTS_CACHE_KEY).await;

    info!(post_id = %post.id, author = %post.author, "post created");
    Ok(Json(post))
}

/// Handler for DELETE /posts/:id
///
/// Succeeds whether or not the post existed.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let id = parse_id(&id)?;

    if state.store.delete_post(id).await? {
        invalidate(&state.cache, POSTS_CACHE_KEY).await;
        info!(post_id = %id, "post deleted");
    }

    Ok(Json(DeleteResponse::success()))
}

/// Handler for POST /posts/thumbup/:id
pub async fn thumbup_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ThumbupResponse>> {
    let id = parse_id(&id)?;

    let post = state
        .store
        .increment_post_thumbs(id)
        .await?
        .ok_or_else(|| BlogError::NotFound("post".to_string()))?;
    // The listing embeds the counter
    invalidate(&state.cache, POSTS_CACHE_KEY).await;

    Ok(Json(ThumbupResponse::success(post.num_of_thumb)))
}
