use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Category stamped on every article this pipeline ingests.
pub const CATEGORY: &str = "technology";

/// A stored headline, as written to and read from the `articles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub title: String,
    pub source: Option<String>,
    pub url: String,
    pub published_at: Option<String>,
    pub category: String,
}

/// One entry of the upstream `articles` list. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// Map a raw record to the storage schema, or `None` when it lacks a
/// title or URL.
pub fn normalize(raw: RawArticle) -> Option<Article> {
    let title = raw.title.filter(|t| !t.is_empty())?;
    let url = raw.url.filter(|u| !u.is_empty())?;

    Some(Article {
        title,
        source: raw.source.and_then(|s| s.name),
        url,
        published_at: raw.published_at,
        category: CATEGORY.to_string(),
    })
}

/// Normalize a whole response into one upsert batch.
///
/// A URL repeated inside the same response keeps its first position but
/// takes the values of its last occurrence, so the batch never holds two
/// rows for one conflict key.
pub fn prepare_batch(raw: Vec<RawArticle>) -> Vec<Article> {
    let mut batch: Vec<Article> = Vec::with_capacity(raw.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for article in raw.into_iter().filter_map(normalize) {
        match positions.get(&article.url) {
            Some(&i) => batch[i] = article,
            None => {
                positions.insert(article.url.clone(), batch.len());
                batch.push(article);
            }
        }
    }

    batch
}
