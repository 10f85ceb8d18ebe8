//! Upstream search query and batch types
//!
//! The catalog asks GitHub for popular repositories (`stars:>N`), optionally
//! restricted to one language and narrowed by free text. One reply of the
//! search endpoint becomes a [`SearchBatch`].

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::CandidateRepository;

/// Minimum star count used when none is configured
pub const DEFAULT_MIN_STARS: u32 = 1000;

/// Language value meaning "no language filter"
pub const ALL_LANGUAGES: &str = "all";

static QUALIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:stars|language|sort|order):\S*").expect("Failed to compile qualifier regex")
});

/// Represents a GitHub repository search query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchQuery(pub String);

impl SearchQuery {
    pub fn new<T: Into<String>>(query: T) -> Self {
        Self(query.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the catalog query: `{text} stars:>{min_stars} language:{language}`
    ///
    /// Qualifiers the catalog controls itself (`stars:`, `language:`, `sort:`,
    /// `order:`) are removed from the free text so they cannot contradict the
    /// ones appended here.
    pub fn for_catalog(min_stars: u32, language: Option<&LanguageFilter>, text: Option<&str>) -> Self {
        let mut parts = Vec::new();

        if let Some(text) = text {
            let cleaned = QUALIFIER_REGEX.replace_all(text, "");
            let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
            if !cleaned.is_empty() {
                parts.push(cleaned);
            }
        }

        parts.push(format!("stars:>{}", min_stars));

        if let Some(language) = language {
            parts.push(format!("language:{}", language.as_str()));
        }

        Self(parts.join(" "))
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lower-cased language name used as a search qualifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct LanguageFilter(String);

impl LanguageFilter {
    /// Returns `None` for an empty value or `"all"`
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() || normalized == ALL_LANGUAGES {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LanguageFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One validated reply of the repository search endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchBatch {
    /// Total number of matches reported upstream
    pub total_count: u64,
    /// Items that passed validation, in upstream order
    pub items: Vec<CandidateRepository>,
    /// Number of raw items in the reply, rejected ones included
    pub received: usize,
}

impl SearchBatch {
    pub fn rejected(&self) -> usize {
        self.received.saturating_sub(self.items.len())
    }
}
