// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// A named page to scrape, e.g. "DLSU USG" → `dlsu.usg`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ContentSource {
    pub name: String,
    pub page_id: String,
}

impl ContentSource {
    pub fn new(name: impl Into<String>, page_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page_id: page_id.into(),
        }
    }
}

/// One post as returned by a fetcher; lives only for a single run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct RawPost {
    pub id: String,
    pub message: Option<String>,
    pub story: Option<String>,
    pub created_at: DateTime<Utc>,
    pub permalink: Option<String>,
    pub author: String,
}

impl RawPost {
    /// `message`, else `story`; `None` when both are missing or empty.
    pub fn text(&self) -> Option<&str> {
        [self.message.as_deref(), self.story.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
    }
}

#[async_trait::async_trait]
pub trait PostFetcher: Send + Sync {
    async fn fetch_posts(&self, page_id: &str, limit: usize) -> Result<Vec<RawPost>>;
    fn name(&self) -> &'static str;
}
