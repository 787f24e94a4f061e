//! Run the ingestion pipeline once and exit, for cron-style schedulers.

use std::sync::Arc;

use tracing::{error, info};

use technews::config::Settings;
use technews::ingest::Ingestor;
use technews::newsapi::NewsApiClient;
use technews::store::Storage;
use technews::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    telemetry::init("technews=info")?;

    let settings = Arc::new(Settings::resolve()?);
    let news = NewsApiClient::new(settings.news_api_url.clone())?;
    let ingestor = Ingestor::new(settings, news, Arc::new(Storage::new()));

    match ingestor.run().await {
        Ok(report) => {
            info!(
                "Done: {} fetched, {} accepted, {} upserted",
                report.fetched, report.accepted, report.upserted
            );
            Ok(())
        }
        Err(e) => {
            error!("An error occurred: {}", e);
            Err(e.into())
        }
    }
}
