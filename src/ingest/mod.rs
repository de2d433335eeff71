// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;

use crate::classify;
use crate::ingest::config::IngestConfig;
use crate::ingest::providers::FacebookGraphClient;
use crate::ingest::types::{ContentSource, PostFetcher, RawPost};
use crate::store::{AnnouncementStore, NewAnnouncement};

/// Characters of post text kept in an announcement title.
pub const TITLE_PREVIEW_CHARS: usize = 100;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_runs_total", "Completed ingestion runs.");
        describe_counter!(
            "ingest_posts_fetched_total",
            "Posts returned by fetchers."
        );
        describe_counter!(
            "ingest_posts_skipped_total",
            "Fetched posts without message or story text."
        );
        describe_counter!(
            "ingest_announcements_created_total",
            "Announcements persisted by ingestion."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Sources abandoned because of a fetch or store error."
        );
        describe_histogram!("ingest_fetch_ms", "Per-source fetch time in milliseconds.");
    });
}

/// `"{source}: {preview}"`, preview cut at [`TITLE_PREVIEW_CHARS`] with `...`.
pub fn build_title(source_name: &str, text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(TITLE_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{source_name}: {}...", &text[..cut]),
        None => format!("{source_name}: {text}"),
    }
}

/// Classify a post's text and shape it into a create candidate.
/// `None` when the post carries no text.
pub fn announcement_from_post(source: &ContentSource, post: &RawPost) -> Option<NewAnnouncement> {
    let text = post.text()?;
    let c = classify::classify(text);
    Some(NewAnnouncement {
        title: build_title(&source.name, text),
        content: text.to_string(),
        category: c.category,
        date: post.created_at,
        relevant_interests: c.relevant_interests,
        relevant_majors: c.relevant_majors,
    })
}

/// What happened to one source during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub source: String,
    pub fetched: usize,
    pub skipped: usize,
    pub created: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub sources: Vec<SourceOutcome>,
}

impl IngestReport {
    /// Announcements created across all sources.
    pub fn count(&self) -> usize {
        self.sources.iter().map(|s| s.created).sum()
    }

    pub fn failed_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.error.is_some()).count()
    }
}

/// Sequential scrape → classify → store pass over a fixed source list.
pub struct IngestJob {
    sources: Vec<ContentSource>,
    fetch_limit: usize,
    fetcher: Arc<dyn PostFetcher>,
    store: Arc<dyn AnnouncementStore>,
}

impl IngestJob {
    pub fn new(
        sources: Vec<ContentSource>,
        fetch_limit: usize,
        fetcher: Arc<dyn PostFetcher>,
        store: Arc<dyn AnnouncementStore>,
    ) -> Self {
        Self {
            sources,
            fetch_limit,
            fetcher,
            store,
        }
    }

    /// Build against the Graph API. Fails without touching the network when
    /// no access token is configured.
    pub fn from_config(cfg: &IngestConfig, store: Arc<dyn AnnouncementStore>) -> Result<Self> {
        let fetcher = FacebookGraphClient::from_config(cfg)?;
        Ok(Self::new(
            cfg.sources.clone(),
            cfg.fetch_limit,
            Arc::new(fetcher),
            store,
        ))
    }

    pub fn sources(&self) -> &[ContentSource] {
        &self.sources
    }

    /// Run once over every source, in order. A failing source is logged and
    /// recorded in its outcome; the run always continues with the next one.
    pub async fn run(&self) -> Result<IngestReport> {
        ensure_metrics_described();

        let mut report = IngestReport::default();
        for source in &self.sources {
            let outcome = self.run_source(source).await;
            if let Some(err) = &outcome.error {
                counter!("ingest_source_errors_total").increment(1);
                tracing::warn!(
                    target: "ingest",
                    source = %source.name,
                    page_id = %source.page_id,
                    provider = self.fetcher.name(),
                    created = outcome.created,
                    error = %err,
                    "source abandoned"
                );
            }
            report.sources.push(outcome);
        }

        counter!("ingest_runs_total").increment(1);
        tracing::info!(
            target: "ingest",
            total = report.count(),
            failed_sources = report.failed_sources(),
            "ingest run finished"
        );
        Ok(report)
    }

    async fn run_source(&self, source: &ContentSource) -> SourceOutcome {
        let mut outcome = SourceOutcome {
            source: source.name.clone(),
            ..Default::default()
        };

        tracing::debug!(
            target: "ingest",
            source = %source.name,
            page_id = %source.page_id,
            "fetching posts"
        );
        let posts = match self
            .fetcher
            .fetch_posts(&source.page_id, self.fetch_limit)
            .await
        {
            Ok(p) => p,
            Err(e) => {
                outcome.error = Some(format!("{e:#}"));
                return outcome;
            }
        };
        outcome.fetched = posts.len();
        counter!("ingest_posts_fetched_total").increment(posts.len() as u64);

        for post in &posts {
            let Some(candidate) = announcement_from_post(source, post) else {
                outcome.skipped += 1;
                counter!("ingest_posts_skipped_total").increment(1);
                tracing::debug!(target: "ingest", post_id = %post.id, "post has no text");
                continue;
            };
            match self.store.create(candidate).await {
                Ok(a) => {
                    outcome.created += 1;
                    counter!("ingest_announcements_created_total").increment(1);
                    tracing::info!(
                        target: "ingest",
                        id = a.id,
                        category = %a.category,
                        title = %a.title,
                        "created announcement"
                    );
                }
                Err(e) => {
                    outcome.error = Some(format!("storing post {}: {e:#}", post.id));
                    break;
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(message: Option<&str>, story: Option<&str>) -> RawPost {
        RawPost {
            id: "1_2".into(),
            message: message.map(Into::into),
            story: story.map(Into::into),
            created_at: Utc.with_ymd_and_hms(2025, 2, 14, 10, 0, 0).unwrap(),
            permalink: None,
            author: "DLSU USG".into(),
        }
    }

    #[test]
    fn short_text_title_is_not_truncated() {
        assert_eq!(build_title("DLSU USG", "Hello"), "DLSU USG: Hello");
    }

    #[test]
    fn long_text_title_is_cut_at_100_chars() {
        let text = "x".repeat(101);
        let t = build_title("Englicom", &text);
        assert_eq!(t, format!("Englicom: {}...", "x".repeat(100)));

        let exact = "y".repeat(100);
        assert_eq!(build_title("E", &exact), format!("E: {exact}"));
    }

    #[test]
    fn title_cut_respects_char_boundaries() {
        let text = "é".repeat(150);
        let t = build_title("S", &text);
        assert!(t.ends_with("..."));
        assert_eq!(t.chars().count(), "S: ".len() + 100 + 3);
    }

    #[test]
    fn story_is_used_when_message_is_missing_or_empty() {
        let src = ContentSource::new("DLSU USG", "dlsu.usg");
        let a = announcement_from_post(&src, &post(None, Some("Campus blood drive this Friday")))
            .expect("story text");
        assert_eq!(a.content, "Campus blood drive this Friday");
        let b = announcement_from_post(&src, &post(Some(""), Some("story"))).unwrap();
        assert_eq!(b.content, "story");
        assert!(announcement_from_post(&src, &post(None, None)).is_none());
        assert!(announcement_from_post(&src, &post(Some(""), Some(""))).is_none());
    }

    #[test]
    fn candidate_keeps_post_timestamp() {
        let src = ContentSource::new("Archers Network", "ArchersNetwork");
        let p = post(Some("Internship fair"), None);
        let a = announcement_from_post(&src, &p).unwrap();
        assert_eq!(a.date, p.created_at);
        assert_eq!(a.category, classify::Category::CareerServices);
        assert!(!a.relevant_majors.is_empty());
    }
}
