//! Blog post documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "postID")]
    pub id: Uuid,
    #[serde(rename = "postAuthor")]
    pub author: String,
    #[serde(rename = "postTitle")]
    pub title: String,
    #[serde(rename = "postTags")]
    pub tags: Vec<String>,
    #[serde(rename = "postCreatedTime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "postLastUpdatedTime")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "postNumOfThumb")]
    pub num_of_thumb: u64,
    #[serde(rename = "postContent")]
    pub content: String,
}

/// Body of `POST /posts`.
///
/// Only the editable fields are read; identifiers, timestamps and counters
/// in the payload are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    #[serde(rename = "postTitle")]
    pub title: String,
    #[serde(rename = "postTags", default)]
    pub tags: Vec<String>,
    #[serde(rename = "postContent", default)]
    pub content: String,
}

impl NewPost {
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("postTitle cannot be empty".to_string());
        }
        None
    }
}

impl Post {
    /// Builds a fresh post: new identifier, zero thumbs, both timestamps now.
    pub fn create(new: NewPost, author: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author: author.into(),
            title: new.title,
            tags: new.tags,
            created_at: now,
            updated_at: now,
            num_of_thumb: 0,
            content: new.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_defaults() {
        let new: NewPost = serde_json::from_str(
            r#"{"postTitle":"Hello","postTags":["rust","web"],"postContent":"body","postNumOfThumb":99}"#,
        )
        .unwrap();

        let post = Post::create(new, "alice");

        assert_eq!(post.author, "alice");
        assert_eq!(post.tags, vec!["rust", "web"]);
        assert_eq!(post.num_of_thumb, 0);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_wire_names() {
        let post = Post::create(
            NewPost {
                title: "t".into(),
                tags: vec![],
                content: "c".into(),
            },
            "bob",
        );
        let json = serde_json::to_value(&post).unwrap();

        for field in [
            "postID",
            "postAuthor",
            "postTitle",
            "postTags",
            "postCreatedTime",
            "postLastUpdatedTime",
            "postNumOfThumb",
            "postContent",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }

    #[test]
    fn test_validate_blank_title() {
        let new = NewPost {
            title: "  ".into(),
            tags: vec![],
            content: String::new(),
        };
        assert!(new.validate().is_some());
    }
}
