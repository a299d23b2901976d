//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::SessionStore;
use crate::cache::{shared, CacheStore, SharedCache};
use crate::config::Config;
use crate::error::Result;
use crate::store::{BlogStore, MemoryStore, SqliteStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of truth for documents
    pub store: Arc<dyn BlogStore>,
    /// Key-value cache for the post listing and sessions
    pub cache: SharedCache,
    pub sessions: SessionStore,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires a document store and a cache engine together.
    pub fn new(store: Arc<dyn BlogStore>, cache: CacheStore, config: Config) -> Self {
        let cache = shared(cache);
        let sessions = SessionStore::new(cache.clone(), config.session_ttl());

        Self {
            store,
            cache,
            sessions,
            config: Arc::new(config),
        }
    }

    /// State backed by the SQLite database at `config.database_url`.
    pub async fn connect(config: Config) -> Result<Self> {
        let store = SqliteStore::connect(&config.database_url, config.db_max_connections).await?;
        Ok(Self::new(Arc::new(store), Self::cache_for(&config), config))
    }

    /// State backed by the in-process store. Nothing survives a restart.
    pub fn in_memory(config: Config) -> Self {
        let cache = Self::cache_for(&config);
        Self::new(Arc::new(MemoryStore::new()), cache, config)
    }

    fn cache_for(config: &Config) -> CacheStore {
        // Entries always carry an explicit TTL, so no store-wide default
        CacheStore::new(config.cache_max_entries, None)
    }

    pub fn posts_cache_ttl(&self) -> Duration {
        self.config.posts_cache_ttl()
    }
}
