use std::sync::Arc;

use crate::article::Article;
use crate::config::Settings;
use crate::error::QueryError;
use crate::store::Storage;

/// How many articles the frontend gets.
pub const RECENT_LIMIT: i64 = 50;

pub struct ArticleQuery {
    settings: Arc<Settings>,
    storage: Arc<Storage>,
}

impl ArticleQuery {
    pub fn new(settings: Arc<Settings>, storage: Arc<Storage>) -> Self {
        Self { settings, storage }
    }

    /// The `limit` most recently published articles, newest first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Article>, QueryError> {
        let config = self.settings.storage_config()?;
        let store = self.storage.get(&config).await?;
        Ok(store.list_recent(limit).await?)
    }
}
