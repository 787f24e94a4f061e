use std::sync::Arc;

use tracing::info;

use crate::article::prepare_batch;
use crate::config::Settings;
use crate::error::IngestError;
use crate::newsapi::NewsApiClient;
use crate::store::Storage;

/// Outcome of one successful ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Records in the upstream response
    pub fetched: usize,
    /// Records that survived normalization and de-duplication
    pub accepted: usize,
    /// Rows the store reported writing
    pub upserted: u64,
}

/// Fetch, normalize and upsert technology headlines.
///
/// Shared by the HTTP trigger and the `fetch-news` command. Runs are
/// independent; concurrent runs rely on the store's upsert to reconcile.
pub struct Ingestor {
    settings: Arc<Settings>,
    news: NewsApiClient,
    storage: Arc<Storage>,
}

impl Ingestor {
    pub fn new(settings: Arc<Settings>, news: NewsApiClient, storage: Arc<Storage>) -> Self {
        Self {
            settings,
            news,
            storage,
        }
    }

    pub async fn run(&self) -> Result<IngestReport, IngestError> {
        let config = self.settings.ingest_config()?;
        let store = self.storage.get(&config.storage).await?;

        info!("Fetching news from NewsAPI...");
        let raw = self.news.top_headlines(&config.news_api_key).await?;
        let fetched = raw.len();

        let batch = prepare_batch(raw);
        if batch.is_empty() {
            info!("No new articles to insert ({} fetched)", fetched);
            return Ok(IngestReport {
                fetched,
                accepted: 0,
                upserted: 0,
            });
        }

        info!("Inserting/updating {} articles...", batch.len());
        let upserted = store.upsert_articles(&batch).await?;
        info!("Successfully inserted/updated {} articles", upserted);

        Ok(IngestReport {
            fetched,
            accepted: batch.len(),
            upserted,
        })
    }
}
