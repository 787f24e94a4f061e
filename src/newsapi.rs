use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::article::{RawArticle, CATEGORY};
use crate::error::UpstreamError;

pub const LANGUAGE: &str = "en";

const USER_AGENT: &str = "TechNews/1.0 (Headline Ingester)";

#[derive(Debug, Deserialize)]
struct TopHeadlines {
    #[serde(default)]
    articles: Option<Vec<RawArticle>>,
}

/// Error body NewsAPI sends alongside non-2xx statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the top-headlines endpoint.
#[derive(Clone)]
pub struct NewsApiClient {
    client: Client,
    endpoint: String,
}

impl NewsApiClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(UpstreamError::Client)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch English technology headlines.
    ///
    /// The key travels in the `X-Api-Key` header so it never shows up in a
    /// URL, and therefore never in an error message.
    pub async fn top_headlines(&self, api_key: &str) -> Result<Vec<RawArticle>, UpstreamError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("X-Api-Key", api_key)
            .query(&[("category", CATEGORY), ("language", LANGUAGE)])
            .send()
            .await
            .map_err(UpstreamError::Request)?;

        let status = response.status();
        let body = response.bytes().await.map_err(UpstreamError::Request)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("no reason").to_string());
            warn!("News API returned {}: {}", status, message);
            return Err(UpstreamError::Status { status, message });
        }

        let articles = parse_headlines(&body)?;
        debug!("News API returned {} articles", articles.len());
        Ok(articles)
    }
}

/// Parse a top-headlines body. A missing or null `articles` list is empty.
pub fn parse_headlines(body: &[u8]) -> Result<Vec<RawArticle>, UpstreamError> {
    let parsed: TopHeadlines = serde_json::from_slice(body)?;
    Ok(parsed.articles.unwrap_or_default())
}
