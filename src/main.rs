use std::sync::Arc;

use tracing::{info, warn};

use technews::config::Settings;
use technews::ingest::Ingestor;
use technews::newsapi::NewsApiClient;
use technews::query::ArticleQuery;
use technews::routes::{self, AppState};
use technews::store::Storage;
use technews::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development keeps secrets in .env
    dotenvy::dotenv().ok();

    telemetry::init("technews=info,tower_http=debug")?;

    let settings = Arc::new(Settings::resolve()?);
    if let Err(e) = settings.ingest_config() {
        warn!("{}; ingestion requests will fail until it is set", e);
    }

    let news = NewsApiClient::new(settings.news_api_url.clone())?;
    info!("Using news endpoint {}", news.endpoint());

    let storage = Arc::new(Storage::new());
    let state = Arc::new(AppState {
        ingestor: Ingestor::new(settings.clone(), news, storage.clone()),
        articles: ArticleQuery::new(settings.clone(), storage),
    });

    let app = routes::app(state, &settings.static_dir);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    info!("Server starting on http://{}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
