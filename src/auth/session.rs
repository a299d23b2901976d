//! Server-side sessions kept in the key-value cache.
//!
//! A session is a random token mapped to the signed-in username under
//! `session:<token>`, expiring after the configured TTL.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::SharedCache;
use crate::error::Result;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "post_api";

const KEY_PREFIX: &str = "session:";

/// The signed-in user behind a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    cache: SharedCache,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(cache: SharedCache, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Starts a session for `username` and returns it.
    pub async fn create(&self, username: &str) -> Result<Session> {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            username: username.to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&session)?;
        self.cache
            .write()
            .await
            .set(key(&session.token), json, Some(self.ttl))?;

        debug!(username = %username, "session created");
        Ok(session)
    }

    /// Resolves a token to its live session.
    pub async fn lookup(&self, token: &str) -> Option<Session> {
        if token.is_empty() {
            return None;
        }

        let json = self.cache.write().await.get(&key(token))?;
        match serde_json::from_str(&json) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "discarding undecodable session");
                self.cache.write().await.delete(&key(token));
                None
            }
        }
    }

    /// Ends the session; unknown tokens are ignored.
    pub async fn destroy(&self, token: &str) {
        if self.cache.write().await.delete(&key(token)) {
            debug!("session destroyed");
        }
    }
}

fn key(token: &str) -> String {
    format!("{KEY_PREFIX}{token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{shared, CacheStore};

    fn sessions(ttl: Duration) -> SessionStore {
        SessionStore::new(shared(CacheStore::new(100, None)), ttl)
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let store = sessions(Duration::from_secs(60));

        let session = store.create("alice").await.unwrap();
        let found = store.lookup(&session.token).await.unwrap();

        assert_eq!(found, session);
        assert!(store.lookup("unknown").await.is_none());
        assert!(store.lookup("").await.is_none());
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = sessions(Duration::from_secs(60));
        let a = store.create("alice").await.unwrap();
        let b = store.create("alice").await.unwrap();
        assert_ne!(a.token, b.token);
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = sessions(Duration::from_secs(60));
        let session = store.create("bob").await.unwrap();

        store.destroy(&session.token).await;
        store.destroy(&session.token).await;

        assert!(store.lookup(&session.token).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_expire() {
        let store = sessions(Duration::from_millis(30));
        let session = store.create("carol").await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(store.lookup(&session.token).await.is_none());
    }
}
