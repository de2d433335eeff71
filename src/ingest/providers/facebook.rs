// src/ingest/providers/facebook.rs
//! Facebook Graph API page-posts fetcher.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::histogram;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::config::IngestConfig;
use crate::ingest::types::{PostFetcher, RawPost};

const POST_FIELDS: &str = "id,message,story,created_time,permalink_url,from";
const GRAPH_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";
/// Upper bound on `paging.next` hops for a single fetch.
const MAX_PAGES: usize = 3;

#[derive(Debug, Deserialize)]
struct PostsPage {
    #[serde(default)]
    data: Vec<GraphPost>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphPost {
    id: String,
    message: Option<String>,
    story: Option<String>,
    created_time: Option<String>,
    permalink_url: Option<String>,
    from: Option<GraphFrom>,
}

#[derive(Debug, Deserialize)]
struct GraphFrom {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<i64>,
}

/// Parse Graph's `2025-03-01T08:15:00+0000`; RFC 3339 is accepted too.
/// Unparseable or missing values fall back to `fallback`.
pub fn parse_graph_time(ts: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let Some(ts) = ts.map(str::trim) else {
        return fallback;
    };
    DateTime::parse_from_str(ts, GRAPH_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(ts))
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(fallback)
}

/// Decode one `/{page-id}/posts` response body.
/// Returns the posts and the `paging.next` cursor URL, if any.
pub fn parse_posts_page(
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<(Vec<RawPost>, Option<String>)> {
    let page: PostsPage = serde_json::from_str(body).context("parsing graph posts json")?;
    let posts = page
        .data
        .into_iter()
        .map(|p| RawPost {
            created_at: parse_graph_time(p.created_time.as_deref(), fetched_at),
            id: p.id,
            message: p.message,
            story: p.story,
            permalink: p.permalink_url,
            author: p.from.map(|f| f.name).unwrap_or_default(),
        })
        .collect();
    Ok((posts, page.paging.and_then(|p| p.next)))
}

fn describe_graph_failure(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<GraphErrorBody>(body) {
        Ok(GraphErrorBody { error }) => format!(
            "graph api {status}: {} (type={}, code={})",
            error.message,
            error.kind.as_deref().unwrap_or("?"),
            error.code.map(|c| c.to_string()).unwrap_or_else(|| "?".into()),
        ),
        Err(_) => format!("graph api {status}"),
    }
}

pub struct FacebookGraphClient {
    base_url: String,
    access_token: String,
    client: Client,
}

impl FacebookGraphClient {
    /// Fails when the token is blank, before any request is made.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into().trim().to_string();
        if access_token.is_empty() {
            return Err(anyhow!("Facebook access token not configured"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("building graph http client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            client,
        })
    }

    pub fn from_config(cfg: &IngestConfig) -> Result<Self> {
        let token = cfg
            .access_token
            .as_deref()
            .ok_or_else(|| anyhow!("Facebook access token not configured"))?;
        Self::new(cfg.graph_base_url.clone(), token)
    }

    /// First-page URL for a page's posts.
    pub fn posts_url(&self, page_id: &str, limit: usize) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}/posts", self.base_url, page_id))
            .with_context(|| format!("building posts url for {page_id}"))?;
        url.query_pairs_mut()
            .append_pair("fields", POST_FIELDS)
            .append_pair("limit", &limit.to_string())
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }

    async fn get_page(&self, url: Url) -> Result<(Vec<RawPost>, Option<String>)> {
        // reqwest errors embed the request url, which carries the token
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("graph http get()")?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("graph http .text()")?;
        if !status.is_success() {
            return Err(anyhow!(describe_graph_failure(status, &body)));
        }
        parse_posts_page(&body, Utc::now())
    }
}

#[async_trait]
impl PostFetcher for FacebookGraphClient {
    async fn fetch_posts(&self, page_id: &str, limit: usize) -> Result<Vec<RawPost>> {
        let t0 = std::time::Instant::now();
        let mut url = self.posts_url(page_id, limit)?;
        let mut out: Vec<RawPost> = Vec::with_capacity(limit);

        for _ in 0..MAX_PAGES {
            let (mut posts, next) = self
                .get_page(url)
                .await
                .with_context(|| format!("fetching posts for {page_id}"))?;
            out.append(&mut posts);
            if out.len() >= limit {
                break;
            }
            match next {
                Some(n) => url = Url::parse(&n).context("parsing graph paging.next")?,
                None => break,
            }
        }
        out.truncate(limit);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_fetch_ms").record(ms);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "Facebook"
    }
}
