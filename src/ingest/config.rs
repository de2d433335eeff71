// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::ContentSource;

pub const ENV_SOURCES_PATH: &str = "INGEST_SOURCES_PATH";
pub const ENV_FETCH_LIMIT: &str = "INGEST_FETCH_LIMIT";
pub const ENV_GRAPH_API_BASE: &str = "GRAPH_API_BASE";
pub const ENV_ACCESS_TOKEN: &str = "FACEBOOK_ACCESS_TOKEN";

pub const DEFAULT_GRAPH_API_BASE: &str = "https://graph.facebook.com/v23.0";
pub const DEFAULT_FETCH_LIMIT: usize = 5;

/// Everything the ingestion job needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub sources: Vec<ContentSource>,
    pub fetch_limit: usize,
    pub graph_base_url: String,
    /// `None` is allowed here; building the Graph client rejects it.
    pub access_token: Option<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            graph_base_url: DEFAULT_GRAPH_API_BASE.to_string(),
            access_token: None,
        }
    }
}

impl IngestConfig {
    /// Resolve from the process environment (after `.env` has been loaded):
    /// sources via [`load_sources_default`], limit/base/token from env vars.
    pub fn from_env() -> Result<Self> {
        let sources = load_sources_default()?;

        let fetch_limit = match std::env::var(ENV_FETCH_LIMIT) {
            Ok(raw) => parse_fetch_limit(&raw)?,
            Err(_) => DEFAULT_FETCH_LIMIT,
        };

        let graph_base_url = std::env::var(ENV_GRAPH_API_BASE)
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_GRAPH_API_BASE.to_string());

        let access_token = std::env::var(ENV_ACCESS_TOKEN)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            sources,
            fetch_limit,
            graph_base_url,
            access_token,
        })
    }
}

fn parse_fetch_limit(raw: &str) -> Result<usize> {
    let n: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("{ENV_FETCH_LIMIT} must be a positive integer, got '{raw}'"))?;
    if n == 0 {
        return Err(anyhow!("{ENV_FETCH_LIMIT} must be at least 1"));
    }
    Ok(n)
}

/// Built-in organisation pages, in scrape order.
pub fn default_sources() -> Vec<ContentSource> {
    [
        ("De La Salle University", "DLSU.Manila.100"),
        ("Archers Network", "ArchersNetwork"),
        ("DLSU USG", "dlsu.usg"),
        ("Englicom", "dlsu.englicom"),
        ("Investor's Society", "InvestorsSocietyDLSU"),
    ]
    .into_iter()
    .map(|(name, page)| ContentSource::new(name, page))
    .collect()
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<ContentSource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load sources using env var + fallbacks:
/// 1) $INGEST_SOURCES_PATH
/// 2) config/ingest_sources.toml
/// 3) config/ingest_sources.json
/// 4) built-in [`default_sources`]
pub fn load_sources_default() -> Result<Vec<ContentSource>> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("{ENV_SOURCES_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/ingest_sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/ingest_sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(default_sources())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<ContentSource>> {
    let try_toml = hint_ext == "toml" || s.contains("[[sources]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported sources format"))
}

fn parse_toml(s: &str) -> Result<Vec<ContentSource>> {
    #[derive(serde::Deserialize)]
    struct TomlSources {
        sources: Vec<ContentSource>,
    }
    let v: TomlSources = toml::from_str(s)?;
    clean_list(v.sources)
}

fn parse_json(s: &str) -> Result<Vec<ContentSource>> {
    let v: Vec<ContentSource> = serde_json::from_str(s)?;
    clean_list(v)
}

/// Trim, drop blank entries and repeated page ids. Keeps first-seen order.
fn clean_list(items: Vec<ContentSource>) -> Result<Vec<ContentSource>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let name = it.name.trim();
        let page_id = it.page_id.trim();
        if name.is_empty() || page_id.is_empty() {
            continue;
        }
        if seen.insert(page_id.to_string()) {
            out.push(ContentSource::new(name, page_id));
        }
    }
    if out.is_empty() {
        return Err(anyhow!("sources list is empty"));
    }
    Ok(out)
}
