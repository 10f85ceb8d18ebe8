//! Validation of raw GitHub REST replies
//!
//! Search and repository replies arrive as untyped JSON. They are converted
//! here, once, into [`SearchBatch`] and [`CandidateRepository`]; nothing past
//! this module looks at raw JSON.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::types::{CandidateRepository, RepositoryId, RepositoryUrl, SearchBatch};

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    total_count: Option<u64>,
    items: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    id: Option<u64>,
    full_name: Option<String>,
    name: Option<String>,
    description: Option<String>,
    html_url: Option<String>,
    language: Option<String>,
    stargazers_count: Option<u64>,
    forks_count: Option<u64>,
    #[serde(default)]
    topics: Option<Vec<String>>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn validate_html_url(raw: &str) -> Result<RepositoryUrl, String> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("invalid html_url '{}': {}", raw, e))?;
    match parsed.scheme() {
        "https" | "http" => Ok(RepositoryUrl::new(parsed.to_string())),
        scheme => Err(format!("unsupported html_url scheme '{}'", scheme)),
    }
}

impl TryFrom<RawRepository> for CandidateRepository {
    type Error = String;

    fn try_from(raw: RawRepository) -> Result<Self, Self::Error> {
        let id = raw.id.ok_or_else(|| "missing id".to_string())?;
        let full_name = raw
            .full_name
            .as_deref()
            .ok_or_else(|| format!("repository {} has no full_name", id))
            .and_then(RepositoryId::parse_full_name)?;
        let html_url = raw
            .html_url
            .as_deref()
            .ok_or_else(|| format!("repository {} has no html_url", full_name))
            .and_then(validate_html_url)?;

        Ok(CandidateRepository {
            id,
            name: raw
                .name
                .unwrap_or_else(|| full_name.repository_name.to_string()),
            full_name,
            description: raw.description,
            html_url,
            language: raw.language.filter(|l| !l.is_empty()),
            stargazers_count: raw.stargazers_count.unwrap_or(0),
            forks_count: raw.forks_count.unwrap_or(0),
            topics: raw.topics.unwrap_or_default(),
            created_at: parse_timestamp(raw.created_at.as_deref()),
            updated_at: parse_timestamp(raw.updated_at.as_deref()),
        })
    }
}

/// Converts one raw repository object
pub fn parse_repository(value: serde_json::Value) -> Result<CandidateRepository> {
    let raw: RawRepository =
        serde_json::from_value(value).context("Malformed repository object")?;
    CandidateRepository::try_from(raw).map_err(|e| anyhow::anyhow!("Invalid repository: {}", e))
}

/// Converts a `/search/repositories` reply
///
/// `total_count` and `items` are required. Individual items that fail
/// validation are dropped with a warning but still counted in `received`.
pub fn parse_search_response(value: serde_json::Value) -> Result<SearchBatch> {
    let raw: RawSearchResponse =
        serde_json::from_value(value).context("Malformed search response")?;

    let total_count = raw
        .total_count
        .ok_or_else(|| anyhow::anyhow!("Search response has no total_count"))?;
    let raw_items = raw
        .items
        .ok_or_else(|| anyhow::anyhow!("Search response has no items"))?;

    let received = raw_items.len();
    let mut items = Vec::with_capacity(received);

    for (index, item) in raw_items.into_iter().enumerate() {
        match parse_repository(item) {
            Ok(repository) => items.push(repository),
            Err(e) => warn!("Skipping search item {}: {:#}", index, e),
        }
    }

    Ok(SearchBatch {
        total_count,
        items,
        received,
    })
}
