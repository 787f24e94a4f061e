use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::article::Article;
use crate::error::{IngestError, QueryError};
use crate::ingest::Ingestor;
use crate::query::{ArticleQuery, RECENT_LIMIT};

pub struct AppState {
    pub ingestor: Ingestor,
    pub articles: ArticleQuery,
}

pub fn app(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route("/api/articles", get(list_articles))
        .route("/api/news/fetch", post(fetch_news))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Errors surfaced as JSON bodies
pub enum ApiError {
    Retrieval(QueryError),
    Ingest(IngestError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            // Query failures stay in the log; the caller gets a fixed message.
            ApiError::Retrieval(err) => {
                error!("Failed to fetch articles: {}", err);
                "Failed to retrieve articles.".to_string()
            }
            ApiError::Ingest(err) => {
                error!("News ingestion failed: {}", err);
                format!("Failed to fetch and insert news: {}", err)
            }
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Retrieval(err)
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        ApiError::Ingest(err)
    }
}

// Route handlers
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let articles = state.articles.list_recent(RECENT_LIMIT).await?;
    Ok(Json(articles))
}

pub async fn fetch_news(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.ingestor.run().await?;
    info!(
        "Ingestion finished: {} fetched, {} accepted, {} upserted",
        report.fetched, report.accepted, report.upserted
    );

    Ok(Json(
        json!({ "message": "News fetching logic executed successfully." }),
    ))
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::newsapi::NewsApiClient;
    use crate::store::{ArticleStore, SqliteStore, Storage};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct TestApp {
        router: Router,
        store: Arc<SqliteStore>,
        static_dir: TempDir,
    }

    async fn create_test_app(settings: Settings) -> TestApp {
        let static_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            static_dir.path().join("index.html"),
            "<html><body>Tech News</body></html>",
        )
        .unwrap();

        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let storage = Arc::new(Storage::with_store(store.clone()));
        let settings = Arc::new(settings);
        let news = NewsApiClient::new(settings.news_api_url.clone()).unwrap();

        let state = Arc::new(AppState {
            ingestor: Ingestor::new(settings.clone(), news, storage.clone()),
            articles: ArticleQuery::new(settings, storage),
        });

        TestApp {
            router: app(state, static_dir.path()),
            store,
            static_dir,
        }
    }

    fn complete_settings(news_api_url: String) -> Settings {
        Settings {
            news_api_url,
            storage_url: Some("sqlite::memory:".to_string()),
            storage_key: Some("local".to_string()),
            news_api_key: Some("news-key".to_string()),
            ..Settings::default()
        }
    }

    async fn body_json(response: Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_fetch() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/news/fetch")
            .body(Body::empty())
            .unwrap()
    }

    mod health_tests {
        use super::*;

        #[tokio::test]
        async fn test_health_endpoint() {
            let test_app = create_test_app(Settings::default()).await;

            let response = test_app
                .router
                .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);

            let body = response.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(&body[..], b"OK");
        }
    }

    mod index_tests {
        use super::*;

        #[tokio::test]
        async fn test_index_serves_static_page() {
            let test_app = create_test_app(Settings::default()).await;

            let response = test_app
                .router
                .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);

            let body = response.into_body().collect().await.unwrap().to_bytes();
            let body_str = String::from_utf8(body.to_vec()).unwrap();
            assert!(body_str.contains("Tech News"));
        }

        #[tokio::test]
        async fn test_index_missing_file() {
            let test_app = create_test_app(Settings::default()).await;
            std::fs::remove_file(test_app.static_dir.path().join("index.html")).unwrap();

            let response = test_app
                .router
                .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    mod articles_tests {
        use super::*;

        #[tokio::test]
        async fn test_articles_empty() {
            let test_app = create_test_app(complete_settings("http://unused".into())).await;

            let response = test_app
                .router
                .oneshot(
                    Request::builder()
                        .uri("/api/articles")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await, serde_json::json!([]));
        }

        #[tokio::test]
        async fn test_articles_returns_stored_rows() {
            let test_app = create_test_app(complete_settings("http://unused".into())).await;
            test_app
                .store
                .upsert_articles(&[Article {
                    title: "A".to_string(),
                    source: Some("S".to_string()),
                    url: "http://x".to_string(),
                    published_at: Some("2024-01-01T00:00:00Z".to_string()),
                    category: "technology".to_string(),
                }])
                .await
                .unwrap();

            let response = test_app
                .router
                .oneshot(
                    Request::builder()
                        .uri("/api/articles")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            assert_eq!(body[0]["title"], "A");
            assert_eq!(body[0]["url"], "http://x");
            assert_eq!(body[0]["category"], "technology");
        }

        #[tokio::test]
        async fn test_articles_missing_config_is_generic_error() {
            let test_app = create_test_app(Settings::default()).await;

            let response = test_app
                .router
                .oneshot(
                    Request::builder()
                        .uri("/api/articles")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                body_json(response).await,
                serde_json::json!({"error": "Failed to retrieve articles."})
            );
        }
    }

    mod fetch_tests {
        use super::*;

        #[tokio::test]
        async fn test_fetch_success() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "articles": [{"title": "A", "url": "http://x", "publishedAt": "2024-01-01T00:00:00Z"}]
                })))
                .expect(1)
                .mount(&server)
                .await;

            let test_app = create_test_app(complete_settings(server.uri())).await;

            let response = test_app.router.oneshot(post_fetch()).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                body_json(response).await,
                serde_json::json!({"message": "News fetching logic executed successfully."})
            );
            assert_eq!(test_app.store.count().await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_fetch_missing_config() {
            let test_app = create_test_app(Settings::default()).await;

            let response = test_app.router.oneshot(post_fetch()).await.unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                body_json(response).await,
                serde_json::json!({
                    "error": "Failed to fetch and insert news: Missing environment variables: SUPABASE_URL, SUPABASE_KEY, NEWS_API_KEY"
                })
            );
        }

        #[tokio::test]
        async fn test_fetch_upstream_failure() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;

            let test_app = create_test_app(complete_settings(server.uri())).await;

            let response = test_app.router.oneshot(post_fetch()).await.unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body = body_json(response).await;
            let error = body["error"].as_str().unwrap();
            assert!(error.starts_with("Failed to fetch and insert news: News API responded with 500"));
        }

        #[tokio::test]
        async fn test_fetch_requires_post() {
            let test_app = create_test_app(Settings::default()).await;

            let response = test_app
                .router
                .oneshot(
                    Request::builder()
                        .uri("/api/news/fetch")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
    }
}
