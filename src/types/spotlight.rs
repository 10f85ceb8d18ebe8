//! Spotlight curation types and validation of the curator's JSON reply
//!
//! Spotlights are hourly batches of repositories picked by an LLM curator.
//! The completion call itself happens elsewhere; this module only accepts its
//! JSON reply, which is treated as untrusted input: every entry must carry a
//! valid `owner/name` and a known difficulty level, and repositories featured
//! recently are dropped.

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::warn;

use super::{CandidateRepository, RepositoryId};

/// Number of earlier spotlights whose repositories must not be repeated
pub const SPOTLIGHT_HISTORY_WINDOW: usize = 5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpotlightEntry {
    pub id: String,
    pub full_name: RepositoryId,
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub ai_reasoning: String,
    pub difficulty_level: DifficultyLevel,
    #[serde(default)]
    pub suggested_features: Vec<String>,
    /// GitHub details, filled in after validation when available
    pub details: Option<CandidateRepository>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spotlight {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub repositories: Vec<SpotlightEntry>,
    pub curator_notes: Option<String>,
    #[serde(default)]
    pub previously_excluded: Vec<RepositoryId>,
}

impl Spotlight {
    pub fn new(
        repositories: Vec<SpotlightEntry>,
        curator_notes: Option<String>,
        previously_excluded: Vec<RepositoryId>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            repositories,
            curator_notes,
            previously_excluded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotlightError {
    /// The reply is not JSON at all
    InvalidJson(String),
    /// The reply has no `repositories` array
    MissingRepositories,
}

impl std::fmt::Display for SpotlightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(msg) => write!(f, "Curator reply is not valid JSON: {}", msg),
            Self::MissingRepositories => {
                write!(f, "Curator reply has no 'repositories' array")
            }
        }
    }
}

impl std::error::Error for SpotlightError {}

#[derive(Debug, Deserialize)]
struct RawSpotlightEntry {
    full_name: Option<String>,
    name: Option<String>,
    description: Option<String>,
    language: Option<String>,
    ai_reasoning: Option<String>,
    difficulty_level: Option<String>,
    #[serde(default)]
    suggested_features: Vec<String>,
}

/// Validates the curator reply `{"repositories": [...]}`
///
/// Malformed entries are skipped with a warning. Entry ids are
/// `owner-name-index`, where `index` is the position in the reply.
pub fn parse_spotlight_reply(
    content: &str,
    previously_featured: &[RepositoryId],
) -> Result<Vec<SpotlightEntry>, SpotlightError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| SpotlightError::InvalidJson(e.to_string()))?;

    let raw_entries = value
        .get("repositories")
        .and_then(|v| v.as_array())
        .ok_or(SpotlightError::MissingRepositories)?;

    let mut entries = Vec::new();
    for (index, raw) in raw_entries.iter().enumerate() {
        match parse_entry(index, raw) {
            Ok(entry) if previously_featured.contains(&entry.full_name) => {
                warn!(
                    "Dropping spotlight entry {} ({}): featured recently",
                    index, entry.full_name
                );
            }
            Ok(entry) => entries.push(entry),
            Err(reason) => warn!("Dropping spotlight entry {}: {}", index, reason),
        }
    }

    Ok(entries)
}

fn parse_entry(index: usize, raw: &serde_json::Value) -> Result<SpotlightEntry, String> {
    let raw: RawSpotlightEntry =
        serde_json::from_value(raw.clone()).map_err(|e| format!("malformed entry: {}", e))?;

    let full_name = raw
        .full_name
        .as_deref()
        .ok_or_else(|| "missing full_name".to_string())
        .and_then(RepositoryId::parse_full_name)?;

    let difficulty_level = raw
        .difficulty_level
        .as_deref()
        .ok_or_else(|| "missing difficulty_level".to_string())?
        .parse::<DifficultyLevel>()
        .map_err(|_| format!("unknown difficulty_level for {}", full_name))?;

    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| full_name.repository_name.to_string());

    Ok(SpotlightEntry {
        id: format!("{}-{}-{}", full_name.owner, full_name.repository_name, index),
        full_name,
        name,
        description: raw.description,
        language: raw.language,
        ai_reasoning: raw.ai_reasoning.unwrap_or_default(),
        difficulty_level,
        suggested_features: raw.suggested_features,
        details: None,
    })
}

/// Time left until the next hourly refresh, as (minutes, seconds)
pub fn time_until_next_refresh(now: DateTime<Utc>) -> (i64, i64) {
    let current_hour = now
        .duration_trunc(Duration::hours(1))
        .unwrap_or(now);
    let next_hour = current_hour + Duration::hours(1);
    let left = (next_hour - now).num_seconds().max(0);
    (left / 60, left % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const REPLY: &str = r#"{
        "repositories": [
            {
                "id": "ignored",
                "name": "excalidraw",
                "full_name": "excalidraw/excalidraw",
                "description": "Virtual whiteboard",
                "language": "TypeScript",
                "ai_reasoning": "Small, well-structured features",
                "difficulty_level": "intermediate",
                "suggested_features": ["export to pdf"]
            },
            {
                "full_name": "not a repo",
                "difficulty_level": "beginner"
            },
            {
                "full_name": "owner/app",
                "difficulty_level": "expert"
            },
            {
                "full_name": "jellyfin/jellyfin",
                "difficulty_level": "Advanced"
            },
            {
                "full_name": "home-assistant/core",
                "difficulty_level": "advanced"
            }
        ]
    }"#;

    #[test]
    fn test_parse_spotlight_reply() {
        let previous = vec![RepositoryId::new("home-assistant", "core")];
        let entries = parse_spotlight_reply(REPLY, &previous).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "excalidraw-excalidraw-0");
        assert_eq!(entries[0].difficulty_level, DifficultyLevel::Intermediate);
        assert_eq!(entries[0].suggested_features, vec!["export to pdf"]);

        assert_eq!(entries[1].id, "jellyfin-jellyfin-3");
        assert_eq!(entries[1].name, "jellyfin");
        assert_eq!(entries[1].difficulty_level, DifficultyLevel::Advanced);
    }

    #[test]
    fn test_parse_spotlight_reply_rejects_bad_shapes() {
        assert!(matches!(
            parse_spotlight_reply("not json", &[]),
            Err(SpotlightError::InvalidJson(_))
        ));
        assert_eq!(
            parse_spotlight_reply(r#"{"items": []}"#, &[]),
            Err(SpotlightError::MissingRepositories)
        );
        assert_eq!(
            parse_spotlight_reply(r#"{"repositories": {}}"#, &[]),
            Err(SpotlightError::MissingRepositories)
        );
    }

    #[test]
    fn test_time_until_next_refresh() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 45, 30).unwrap();
        assert_eq!(time_until_next_refresh(now), (14, 30));

        let on_the_hour = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
        assert_eq!(time_until_next_refresh(on_the_hour), (60, 0));
    }
}
