//! Comment handlers.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::info;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::Session;
use crate::error::{BlogError, Result};
use crate::models::{parse_id, Comment, NewComment, ThumbupOutcome, ThumbupResponse};

/// Handler for GET /comments/:postid
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Comment>>> {
    let post_id = parse_id(&post_id)?;
    Ok(Json(state.store.list_comments_for_post(post_id).await?))
}

/// Handler for POST /comments/:postid
///
/// The parent post must exist; the author is the signed-in user.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Extension(session): Extension<Session>,
    Json(new): Json<NewComment>,
) -> Result<Json<Comment>> {
    let post_id = parse_id(&post_id)?;
    if let Some(error_msg) = new.validate() {
        return Err(BlogError::BadRequest(error_msg));
    }

    if state.store.get_post(post_id).await?.is_none() {
        return Err(BlogError::NotFound("post".to_string()));
    }

    let comment = Comment::create(new, post_id, session.username);
    state.store.insert_comment(comment.clone()).await?;

    info!(comment_id = %comment.id, post_id = %post_id, "comment created");
    Ok(Json(comment))
}

/// Handler for GET /comments/by/:username
///
/// Ids of the comments the user wrote.
pub async fn comments_by_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Uuid>>> {
    let comments = state.store.list_comments_by_user(&username).await?;
    Ok(Json(comments.into_iter().map(|c| c.id).collect()))
}

/// Handler for GET /comments/thumbupedby/:username
pub async fn thumbed_up_by_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Uuid>>> {
    Ok(Json(state.store.list_thumbups_by_user(&username).await?))
}

/// Handler for POST /comments/thumbup/:commentid
///
/// Counts at most once per user and comment.
pub async fn thumbup_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Extension(session): Extension<Session>,
) -> Result<Json<ThumbupResponse>> {
    let comment_id = parse_id(&comment_id)?;

    let outcome = state
        .store
        .thumbup_comment(comment_id, &session.username)
        .await?
        .ok_or_else(|| BlogError::NotFound("comment".to_string()))?;

    Ok(Json(match outcome {
        ThumbupOutcome::Counted(comment) => ThumbupResponse::success(comment.num_of_thumb),
        ThumbupOutcome::AlreadyCounted(comment) => {
            ThumbupResponse::already_counted(comment.num_of_thumb)
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{NewPost, Post};
    use chrono::Utc;

    fn session(username: &str) -> Extension<Session> {
        Extension(Session {
            token: "t".to_string(),
            username: username.to_string(),
            created_at: Utc::now(),
        })
    }

    async fn state_with_post() -> (AppState, Uuid) {
        let state = AppState::in_memory(Config::default());
        let post = Post::create(
            NewPost {
                title: "parent".to_string(),
                tags: vec![],
                content: String::new(),
            },
            "alice",
        );
        let id = post.id;
        state.store.insert_post(post).await.unwrap();
        (state, id)
    }

    fn body(text: &str) -> Json<NewComment> {
        Json(NewComment {
            content: text.to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (state, post_id) = state_with_post().await;

        let Json(comment) = create_comment(
            State(state.clone()),
            Path(post_id.to_string()),
            session("bob"),
            body("first!"),
        )
        .await
        .unwrap();
        assert_eq!(comment.username, "bob");
        assert_eq!(comment.post_id, post_id);
        assert_eq!(comment.num_of_thumb, 0);

        let Json(listed) = list_comments(State(state.clone()), Path(post_id.to_string()))
            .await
            .unwrap();
        assert_eq!(listed, vec![comment.clone()]);

        let Json(ids) = comments_by_user(State(state), Path("bob".to_string()))
            .await
            .unwrap();
        assert_eq!(ids, vec![comment.id]);
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let (state, _) = state_with_post().await;

        let result = create_comment(
            State(state),
            Path(Uuid::new_v4().to_string()),
            session("bob"),
            body("hello?"),
        )
        .await;
        assert!(matches!(result, Err(BlogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_thumbup_once_per_user() {
        let (state, post_id) = state_with_post().await;
        let Json(comment) = create_comment(
            State(state.clone()),
            Path(post_id.to_string()),
            session("bob"),
            body("like me"),
        )
        .await
        .unwrap();
        let path = || Path(comment.id.to_string());

        let Json(first) = thumbup_comment(State(state.clone()), path(), session("carol"))
            .await
            .unwrap();
        assert_eq!(first.thumbup_result, "success");
        assert_eq!(first.num_of_thumb, 1);

        let Json(again) = thumbup_comment(State(state.clone()), path(), session("carol"))
            .await
            .unwrap();
        assert_eq!(again.thumbup_result, "already thumbed up");
        assert_eq!(again.num_of_thumb, 1);

        let Json(ids) = thumbed_up_by_user(State(state), Path("carol".to_string()))
            .await
            .unwrap();
        assert_eq!(ids, vec![comment.id]);
    }

    #[tokio::test]
    async fn test_thumbup_unknown_comment() {
        let (state, _) = state_with_post().await;
        let result =
            thumbup_comment(State(state), Path(Uuid::new_v4().to_string()), session("x")).await;
        assert!(matches!(result, Err(BlogError::NotFound(_))));
    }
}
