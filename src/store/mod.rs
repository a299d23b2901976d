//! Document Store Module
//!
//! The source of truth for posts, comments, users and comment thumb-ups.
//! Handlers only see the [`BlogStore`] trait. [`SqliteStore`] persists to
//! a database file; [`MemoryStore`] keeps everything in process.
//!
//! Every read-modify-write (thumb-up counters, unique usernames) happens
//! inside a single store call so concurrent requests cannot lose updates.

mod memory;
mod sqlite;


use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Comment, Post, ThumbupOutcome, User};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait BlogStore: Send + Sync {
    // == Posts ==
    async fn insert_post(&self, post: Post) -> Result<()>;

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>>;

    /// All posts, oldest first.
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Posts whose title equals `title` exactly, oldest first.
    async fn find_posts_by_title(&self, title: &str) -> Result<Vec<Post>>;

    /// One post sampled uniformly, or None when there are none.
    async fn random_post(&self) -> Result<Option<Post>>;

    /// Returns whether a post was removed.
    async fn delete_post(&self, id: Uuid) -> Result<bool>;

    /// Atomically adds one thumb to the post and returns it.
    async fn increment_post_thumbs(&self, id: Uuid) -> Result<Option<Post>>;

    // == Comments ==
    async fn insert_comment(&self, comment: Comment) -> Result<()>;

    /// Comments attached to `post_id`, oldest first.
    async fn list_comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    /// Comments written by `username`, oldest first.
    async fn list_comments_by_user(&self, username: &str) -> Result<Vec<Comment>>;

    /// Records the `(username, comment)` pair and adds one thumb, unless the
    /// pair already exists. None when the comment does not exist.
    async fn thumbup_comment(
        &self,
        comment_id: Uuid,
        username: &str,
    ) -> Result<Option<ThumbupOutcome>>;

    /// Ids of the comments `username` has thumbed up, in thumb-up order.
    async fn list_thumbups_by_user(&self, username: &str) -> Result<Vec<Uuid>>;

    // == Users ==
    /// Fails with `Conflict` when the username is taken.
    async fn insert_user(&self, user: User) -> Result<()>;

    async fn find_user(&self, username: &str) -> Result<Option<User>>;
}
