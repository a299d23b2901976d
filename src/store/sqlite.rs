//! SQLite-backed document store.
//!
//! Counters are bumped by single `UPDATE ... RETURNING` statements and
//! comment thumb-ups are deduplicated by a UNIQUE index, so concurrent
//! requests never lose an increment.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{BlogError, Result};
use crate::models::{Comment, Post, ThumbupOutcome, User};
use crate::store::BlogStore;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id           TEXT PRIMARY KEY,
        author       TEXT NOT NULL,
        title        TEXT NOT NULL,
        tags         TEXT NOT NULL,
        created_at   INTEGER NOT NULL,
        updated_at   INTEGER NOT NULL,
        num_of_thumb INTEGER NOT NULL DEFAULT 0,
        content      TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS posts_title_idx ON posts (title)",
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id           TEXT PRIMARY KEY,
        username     TEXT NOT NULL,
        post_id      TEXT NOT NULL,
        created_at   INTEGER NOT NULL,
        num_of_thumb INTEGER NOT NULL DEFAULT 0,
        content      TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS comments_post_idx ON comments (post_id)",
    "CREATE INDEX IF NOT EXISTS comments_username_idx ON comments (username)",
    r#"
    CREATE TABLE IF NOT EXISTS comment_thumbups (
        seq        INTEGER PRIMARY KEY AUTOINCREMENT,
        comment_id TEXT NOT NULL,
        username   TEXT NOT NULL,
        UNIQUE (comment_id, username)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            TEXT PRIMARY KEY,
        username      TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    INTEGER NOT NULL
    )
    "#,
];

const POST_COLUMNS: &str =
    "id, author, title, tags, created_at, updated_at, num_of_thumb, content";
const COMMENT_COLUMNS: &str = "id, username, post_id, created_at, num_of_thumb, content";

/// Document store persisted in a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and applies the schema.
    ///
    /// `sqlite::memory:` gives a private database that lives as long as the
    /// store.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let in_memory = url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // The in-memory database lives only as long as its one pinned connection
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.migrate().await?;

        info!(in_memory, "document store ready");
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// == Row Mapping ==
#[derive(FromRow)]
struct PostRow {
    id: String,
    author: String,
    title: String,
    tags: String,
    created_at: i64,
    updated_at: i64,
    num_of_thumb: i64,
    content: String,
}

impl TryFrom<PostRow> for Post {
    type Error = BlogError;

    fn try_from(row: PostRow) -> Result<Self> {
        Ok(Post {
            id: parse_stored_id(&row.id)?,
            author: row.author,
            title: row.title,
            tags: serde_json::from_str(&row.tags)?,
            created_at: from_nanos(row.created_at),
            updated_at: from_nanos(row.updated_at),
            num_of_thumb: to_count(row.num_of_thumb),
            content: row.content,
        })
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: String,
    username: String,
    post_id: String,
    created_at: i64,
    num_of_thumb: i64,
    content: String,
}

impl TryFrom<CommentRow> for Comment {
    type Error = BlogError;

    fn try_from(row: CommentRow) -> Result<Self> {
        Ok(Comment {
            id: parse_stored_id(&row.id)?,
            username: row.username,
            post_id: parse_stored_id(&row.post_id)?,
            created_at: from_nanos(row.created_at),
            num_of_thumb: to_count(row.num_of_thumb),
            content: row.content,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    created_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = BlogError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: parse_stored_id(&row.id)?,
            username: row.username,
            password_hash: row.password_hash,
            created_at: from_nanos(row.created_at),
        })
    }
}

fn parse_stored_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| BlogError::Database(format!("corrupt id {raw:?}: {e}")))
}

fn to_nanos(time: DateTime<Utc>) -> Result<i64> {
    time.timestamp_nanos_opt()
        .ok_or_else(|| BlogError::Internal(format!("timestamp {time} out of range")))
}

fn from_nanos(nanos: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(nanos)
}

fn to_count(stored: i64) -> u64 {
    u64::try_from(stored).unwrap_or_default()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = BlogError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl BlogStore for SqliteStore {
    async fn insert_post(&self, post: Post) -> Result<()> {
        let result = sqlx::query(&format!(
            "INSERT INTO posts ({POST_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(post.id.to_string())
        .bind(&post.author)
        .bind(&post.title)
        .bind(serde_json::to_string(&post.tags)?)
        .bind(to_nanos(post.created_at)?)
        .bind(to_nanos(post.updated_at)?)
        .bind(i64::try_from(post.num_of_thumb).unwrap_or(i64::MAX))
        .bind(&post.content)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(BlogError::Conflict(format!(
                "post {} already exists",
                post.id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(Post::try_from)
        .transpose()
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn find_posts_by_title(&self, title: &str) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE title = ? ORDER BY created_at, id"
        ))
        .bind(title)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn random_post(&self) -> Result<Option<Post>> {
        sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY RANDOM() LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?
        .map(Post::try_from)
        .transpose()
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_post_thumbs(&self, id: Uuid) -> Result<Option<Post>> {
        sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE posts SET num_of_thumb = num_of_thumb + 1 WHERE id = ? \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(Post::try_from)
        .transpose()
    }

    async fn insert_comment(&self, comment: Comment) -> Result<()> {
        let result = sqlx::query(&format!(
            "INSERT INTO comments ({COMMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
        ))
        .bind(comment.id.to_string())
        .bind(&comment.username)
        .bind(comment.post_id.to_string())
        .bind(to_nanos(comment.created_at)?)
        .bind(i64::try_from(comment.num_of_thumb).unwrap_or(i64::MAX))
        .bind(&comment.content)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(BlogError::Conflict(format!(
                "comment {} already exists",
                comment.id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ? ORDER BY created_at, id"
        ))
        .bind(post_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn list_comments_by_user(&self, username: &str) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE username = ? ORDER BY created_at, id"
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn thumbup_comment(
        &self,
        comment_id: Uuid,
        username: &str,
    ) -> Result<Option<ThumbupOutcome>> {
        let id = comment_id.to_string();
        let mut tx = self.pool.begin().await?;

        // Writing first takes the database write lock before anything is read
        let inserted = sqlx::query(
            r#"
            INSERT INTO comment_thumbups (comment_id, username)
            SELECT ?, ? WHERE EXISTS (SELECT 1 FROM comments WHERE id = ?)
            ON CONFLICT (comment_id, username) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(username)
        .bind(&id)
        .execute(&mut *tx)
        .await?;
        let recorded = inserted.rows_affected() > 0;

        let row = if recorded {
            sqlx::query_as::<_, CommentRow>(&format!(
                "UPDATE comments SET num_of_thumb = num_of_thumb + 1 WHERE id = ? \
                 RETURNING {COMMENT_COLUMNS}"
            ))
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            sqlx::query_as::<_, CommentRow>(&format!(
                "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?"
            ))
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await?
        };

        tx.commit().await?;

        let Some(row) = row else {
            debug!(comment_id = %comment_id, "thumb-up for unknown comment");
            return Ok(None);
        };
        let comment = Comment::try_from(row)?;

        Ok(Some(if recorded {
            ThumbupOutcome::Counted(comment)
        } else {
            ThumbupOutcome::AlreadyCounted(comment)
        }))
    }

    async fn list_thumbups_by_user(&self, username: &str) -> Result<Vec<Uuid>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT comment_id FROM comment_thumbups WHERE username = ? ORDER BY seq",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        ids.iter().map(String::as_str).map(parse_stored_id).collect()
    }

    async fn insert_user(&self, user: User) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(to_nanos(user.created_at)?)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(BlogError::Conflict("username already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }
}
