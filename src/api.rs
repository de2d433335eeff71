use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;

use crate::classify::{self, Category};
use crate::ingest::config::IngestConfig;
use crate::ingest::types::PostFetcher;
use crate::ingest::IngestJob;
use crate::store::{Announcement, AnnouncementStore, MemoryStore, NewAnnouncement};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AnnouncementStore>,
    pub ingest: Arc<IngestConfig>,
    /// Overrides the Graph client built from `ingest` on every scrape.
    pub fetcher: Option<Arc<dyn PostFetcher>>,
}

impl AppState {
    pub fn new(store: Arc<dyn AnnouncementStore>, ingest: IngestConfig) -> Self {
        Self {
            store,
            ingest: Arc::new(ingest),
            fetcher: None,
        }
    }

    /// Empty memory store with the given ingestion config.
    pub fn in_memory(ingest: IngestConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), ingest)
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn PostFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    fn ingest_job(&self) -> anyhow::Result<IngestJob> {
        match &self.fetcher {
            Some(f) => Ok(IngestJob::new(
                self.ingest.sources.clone(),
                self.ingest.fetch_limit,
                f.clone(),
                self.store.clone(),
            )),
            None => IngestJob::from_config(&self.ingest, self.store.clone()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/scrape-facebook", post(scrape_facebook))
        .route(
            "/api/announcements",
            get(list_announcements).post(create_announcement),
        )
        .route("/api/announcements/{id}", get(get_announcement))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, serde::Serialize)]
pub struct MessageResp {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type ApiError = (StatusCode, Json<MessageResp>);

fn fail(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(MessageResp {
            message: message.to_string(),
            error: None,
        }),
    )
}

fn internal(e: anyhow::Error) -> ApiError {
    tracing::error!(target: "api", error = ?e, "store error");
    fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

#[derive(Debug, serde::Serialize)]
struct ScrapeResp {
    message: String,
    count: usize,
}

async fn scrape_facebook(State(state): State<AppState>) -> Result<Json<ScrapeResp>, ApiError> {
    let outcome = match state.ingest_job() {
        Ok(job) => job.run().await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(report) => {
            let count = report.count();
            Ok(Json(ScrapeResp {
                message: format!(
                    "Successfully scraped and stored {count} announcements from Facebook"
                ),
                count,
            }))
        }
        Err(e) => {
            tracing::error!(target: "api", error = ?e, "facebook scraping error");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResp {
                    message: "Failed to scrape Facebook posts".into(),
                    error: Some(e.to_string()),
                }),
            ))
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ListQuery {
    category: Option<String>,
    interests: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CategoryFilter {
    Any,
    Only(Category),
    /// Not a known category; nothing can match it.
    Unknown,
}

/// `None`, blank or `all` → no filter.
fn parse_category_filter(raw: Option<&str>) -> CategoryFilter {
    match raw.map(str::trim) {
        None | Some("") => CategoryFilter::Any,
        Some(s) if s.eq_ignore_ascii_case("all") => CategoryFilter::Any,
        Some(s) => s
            .parse()
            .map(CategoryFilter::Only)
            .unwrap_or(CategoryFilter::Unknown),
    }
}

fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

async fn list_announcements(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    let category = match parse_category_filter(q.category.as_deref()) {
        CategoryFilter::Any => None,
        CategoryFilter::Only(c) => Some(c),
        CategoryFilter::Unknown => {
            tracing::debug!(target: "api", category = ?q.category, "unknown category filter");
            return Ok(Json(Vec::new()));
        }
    };
    let interests = split_csv(q.interests.as_deref());
    let rows = state
        .store
        .list_filtered(category, &interests)
        .await
        .map_err(internal)?;
    Ok(Json(rows))
}

async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Announcement>, ApiError> {
    match state.store.get(id).await.map_err(internal)? {
        Some(a) => Ok(Json(a)),
        None => Err(fail(StatusCode::NOT_FOUND, "Announcement not found")),
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAnnouncementReq {
    title: String,
    content: String,
    category: Option<String>,
    date: Option<DateTime<Utc>>,
    #[serde(default)]
    relevant_interests: Vec<String>,
    #[serde(default)]
    relevant_majors: Vec<String>,
}

/// Fill whatever the client left out from the classifier's view of `content`.
fn candidate_from_request(req: CreateAnnouncementReq) -> Result<NewAnnouncement, ApiError> {
    let title = req.title.trim().to_string();
    if title.is_empty() || req.content.trim().is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Invalid announcement data"));
    }

    let category = match req.category.as_deref().map(str::trim) {
        None | Some("") => classify::classify_category(&req.content),
        Some(s) => s
            .parse()
            .map_err(|_| fail(StatusCode::BAD_REQUEST, "Invalid announcement data"))?,
    };
    let relevant_interests = if req.relevant_interests.is_empty() {
        classify::classify_interests(&req.content)
    } else {
        req.relevant_interests
    };
    let relevant_majors = if req.relevant_majors.is_empty() {
        classify::classify_departments(&req.content)
    } else {
        req.relevant_majors
    };

    Ok(NewAnnouncement {
        title,
        content: req.content,
        category,
        date: req.date.unwrap_or_else(Utc::now),
        relevant_interests,
        relevant_majors,
    })
}

async fn create_announcement(
    State(state): State<AppState>,
    Json(req): Json<CreateAnnouncementReq>,
) -> Result<(StatusCode, Json<Announcement>), ApiError> {
    let candidate = candidate_from_request(req)?;
    let created = state.store.create(candidate).await.map_err(internal)?;
    tracing::info!(
        target: "api",
        id = created.id,
        category = %created.category,
        "announcement created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}
