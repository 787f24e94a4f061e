use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use super::ArticleStore;
use crate::article::Article;
use crate::error::StoreError;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// A fresh, initialized in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let store = Self::new("sqlite::memory:").await?;
        store.initialize().await?;
        Ok(store)
    }

    pub async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                source TEXT,
                url TEXT NOT NULL UNIQUE,
                published_at TEXT,
                category TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_articles_published
            ON articles(published_at DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    pub async fn get_by_url(&self, url: &str) -> Result<Option<Article>, StoreError> {
        let article = sqlx::query_as::<_, Article>(
            "SELECT title, source, url, published_at, category FROM articles WHERE url = ?",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(article)
    }
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn upsert_articles(&self, articles: &[Article]) -> Result<u64, StoreError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for article in articles {
            let result = sqlx::query(
                r#"
                INSERT INTO articles (title, source, url, published_at, category, fetched_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(url) DO UPDATE SET
                    title = excluded.title,
                    source = excluded.source,
                    published_at = excluded.published_at,
                    category = excluded.category,
                    fetched_at = excluded.fetched_at
                "#,
            )
            .bind(&article.title)
            .bind(&article.source)
            .bind(&article.url)
            .bind(&article.published_at)
            .bind(&article.category)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Article>, StoreError> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT title, source, url, published_at, category FROM articles
            ORDER BY published_at DESC NULLS LAST, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(articles)
    }
}
