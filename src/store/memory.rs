//! In-process document store.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use rand::seq::IteratorRandom;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{BlogError, Result};
use crate::models::{Comment, Post, ThumbupOutcome, ThumbupRecord, User};
use crate::store::BlogStore;

#[derive(Debug, Default)]
struct CommentTable {
    comments: HashMap<Uuid, Comment>,
    thumbed: HashSet<ThumbupRecord>,
    /// Same records as `thumbed`, in insertion order
    thumbup_log: Vec<ThumbupRecord>,
}

/// Document store backed by hash maps, one lock per collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: RwLock<HashMap<Uuid, Post>>,
    comments: RwLock<CommentTable>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn oldest_first_posts(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    posts
}

fn oldest_first_comments(mut comments: Vec<Comment>) -> Vec<Comment> {
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    comments
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn insert_post(&self, post: Post) -> Result<()> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(BlogError::Conflict(format!("post {} already exists", post.id)));
        }
        posts.insert(post.id, post);
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let posts = self.posts.read().await.values().cloned().collect();
        Ok(oldest_first_posts(posts))
    }

    async fn find_posts_by_title(&self, title: &str) -> Result<Vec<Post>> {
        let posts = self
            .posts
            .read()
            .await
            .values()
            .filter(|post| post.title == title)
            .cloned()
            .collect();
        Ok(oldest_first_posts(posts))
    }

    async fn random_post(&self) -> Result<Option<Post>> {
        let posts = self.posts.read().await;
        let picked = posts.values().choose(&mut rand::thread_rng()).cloned();
        Ok(picked)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }

    async fn increment_post_thumbs(&self, id: Uuid) -> Result<Option<Post>> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&id).map(|post| {
            post.num_of_thumb += 1;
            post.clone()
        }))
    }

    async fn insert_comment(&self, comment: Comment) -> Result<()> {
        let mut table = self.comments.write().await;
        if table.comments.contains_key(&comment.id) {
            return Err(BlogError::Conflict(format!(
                "comment {} already exists",
                comment.id
            )));
        }
        table.comments.insert(comment.id, comment);
        Ok(())
    }

    async fn list_comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let comments = self
            .comments
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        Ok(oldest_first_comments(comments))
    }

    async fn list_comments_by_user(&self, username: &str) -> Result<Vec<Comment>> {
        let comments = self
            .comments
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.username == username)
            .cloned()
            .collect();
        Ok(oldest_first_comments(comments))
    }

    async fn thumbup_comment(
        &self,
        comment_id: Uuid,
        username: &str,
    ) -> Result<Option<ThumbupOutcome>> {
        let mut guard = self.comments.write().await;
        let table = &mut *guard;

        let Some(comment) = table.comments.get_mut(&comment_id) else {
            return Ok(None);
        };

        let record = ThumbupRecord {
            comment_id,
            username: username.to_string(),
        };
        if table.thumbed.contains(&record) {
            return Ok(Some(ThumbupOutcome::AlreadyCounted(comment.clone())));
        }

        comment.num_of_thumb += 1;
        table.thumbed.insert(record.clone());
        table.thumbup_log.push(record);
        Ok(Some(ThumbupOutcome::Counted(comment.clone())))
    }

    async fn list_thumbups_by_user(&self, username: &str) -> Result<Vec<Uuid>> {
        Ok(self
            .comments
            .read()
            .await
            .thumbup_log
            .iter()
            .filter(|r| r.username == username)
            .map(|r| r.comment_id)
            .collect())
    }

    async fn insert_user(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(BlogError::Conflict("username already exists".to_string()));
        }
        users.insert(user.username.clone(), user);
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }
}
