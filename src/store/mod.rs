//! Article persistence.
//!
//! [`ArticleStore`] is the seam between the pipeline and a concrete table:
//! [`SupabaseStore`] talks PostgREST to the hosted database, [`SqliteStore`]
//! keeps the same table in a local SQLite file for development and tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use crate::article::Article;
use crate::config::StorageConfig;
use crate::error::StoreError;

pub mod sqlite;
pub mod supabase;

pub use sqlite::SqliteStore;
pub use supabase::SupabaseStore;

/// Name of the table both backends read and write.
pub const TABLE: &str = "articles";

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert or overwrite `articles` in one call, keyed on `url`.
    /// Returns the number of rows written.
    async fn upsert_articles(&self, articles: &[Article]) -> Result<u64, StoreError>;

    /// Up to `limit` articles, newest `published_at` first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<Article>, StoreError>;
}

pub type SharedStore = Arc<dyn ArticleStore>;

/// Open the backend `config.url` points at.
pub async fn connect(config: &StorageConfig) -> Result<SharedStore, StoreError> {
    if config.url.starts_with("sqlite:") {
        let store = SqliteStore::new(&config.url).await?;
        store.initialize().await?;
        info!("Using SQLite article store");
        Ok(Arc::new(store))
    } else {
        let store = SupabaseStore::new(&config.url, &config.key)?;
        info!("Using Supabase article store at {}", config.url);
        Ok(Arc::new(store))
    }
}

/// A store connected on first use and shared afterwards.
#[derive(Default)]
pub struct Storage {
    store: OnceCell<SharedStore>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that is already connected, ignoring whatever URL callers pass.
    pub fn with_store(store: SharedStore) -> Self {
        Self {
            store: OnceCell::new_with(Some(store)),
        }
    }

    pub async fn get(&self, config: &StorageConfig) -> Result<&SharedStore, StoreError> {
        self.store.get_or_try_init(|| connect(config)).await
    }
}
