use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use super::{ArticleStore, TABLE};
use crate::article::Article;
use crate::error::StoreError;

/// The `articles` table of a Supabase project, through its PostgREST API.
pub struct SupabaseStore {
    client: Client,
    table_url: String,
    key: String,
}

impl SupabaseStore {
    pub fn new(project_url: &str, key: &str) -> Result<Self, StoreError> {
        let client = Client::builder().build().map_err(StoreError::Client)?;

        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{}", project_url.trim_end_matches('/'), TABLE),
            key: key.to_string(),
        })
    }

    pub fn table_url(&self) -> &str {
        &self.table_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status { status, body })
    }
}

#[async_trait]
impl ArticleStore for SupabaseStore {
    async fn upsert_articles(&self, articles: &[Article]) -> Result<u64, StoreError> {
        debug!("Upserting {} rows into {}", articles.len(), self.table_url);

        let request = self
            .client
            .post(&self.table_url)
            .query(&[("on_conflict", "url")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(articles);

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(StoreError::Request)?;
        Self::check(response).await?;

        Ok(articles.len() as u64)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Article>, StoreError> {
        let limit = limit.to_string();
        let request = self.client.get(&self.table_url).query(&[
            ("select", "*"),
            ("order", "published_at.desc.nullslast"),
            ("limit", limit.as_str()),
        ]);

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(StoreError::Request)?;
        let articles = Self::check(response)
            .await?
            .json::<Vec<Article>>()
            .await
            .map_err(StoreError::Request)?;

        Ok(articles)
    }
}
