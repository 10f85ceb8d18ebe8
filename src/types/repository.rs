//! Repository domain types and identifier parsing
//!
//! A repository is identified by its `owner/name` pair. The identifier can be
//! parsed from the plain `owner/name` form used by the search API, from a
//! GitHub HTTPS URL, or from an SSH remote. [`CandidateRepository`] is the
//! validated shape every upstream search item is converted into before it is
//! classified or shown.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Repository URL wrapper for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct RepositoryUrl(pub String);

static HTTPS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?github\.com/([^/]+)/([^/]+?)(?:\.git)?(?:/.*)?/?$")
        .expect("Failed to compile HTTPS regex")
});

static SSH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^git@github\.com:([^/]+)/([^/]+?)(?:\.git)?/?$")
        .expect("Failed to compile SSH regex")
});

static FULL_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$").expect("Failed to compile full name regex")
});

/// Owner name wrapper for type safety
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, PartialOrd, Ord,
)]
pub struct Owner(pub String);

impl Owner {
    pub fn new(owner: String) -> Self {
        Self(owner)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Owner {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Repository name wrapper for type safety
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, PartialOrd, Ord,
)]
pub struct RepositoryName(pub String);

impl RepositoryName {
    pub fn new(repo_name: String) -> Self {
        Self(repo_name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RepositoryName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl RepositoryUrl {
    pub fn new(url: String) -> Self {
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepositoryUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strongly-typed `owner/name` identifier for GitHub repositories
///
/// Serialized as the `owner/name` string, which is also the form the
/// blocklist is matched against (exact and case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryId {
    pub owner: Owner,
    pub repository_name: RepositoryName,
}

impl RepositoryId {
    /// Creates a repository identifier from already validated parts
    pub fn new<T1: Into<String>, T2: Into<String>>(owner: T1, name: T2) -> Self {
        Self {
            owner: Owner::new(owner.into()),
            repository_name: RepositoryName::new(name.into()),
        }
    }

    /// Parse the `owner/name` form used by the GitHub API
    pub fn parse_full_name(input: &str) -> Result<Self, String> {
        let captures = FULL_NAME_REGEX
            .captures(input.trim())
            .ok_or_else(|| format!("Invalid repository full name: {}", input))?;

        match (captures.get(1), captures.get(2)) {
            (Some(owner), Some(name)) if !matches!(name.as_str(), "." | "..") => {
                Ok(Self::new(owner.as_str(), name.as_str()))
            }
            _ => Err(format!("Invalid repository full name: {}", input)),
        }
    }

    /// Parse repository identifier from various input formats
    /// - "owner/repo"
    /// - "https://github.com/owner/repo" - GitHub URL
    /// - "git@github.com:owner/repo.git" - SSH format
    pub fn parse_url(input: &RepositoryUrl) -> Result<Self, String> {
        let input_str = input.as_str().trim().trim_end_matches('/');

        for regex in [&*HTTPS_REGEX, &*SSH_REGEX] {
            if let Some(captures) = regex.captures(input_str) {
                if let (Some(owner), Some(repo)) = (captures.get(1), captures.get(2)) {
                    return Self::parse_full_name(&format!("{}/{}", owner.as_str(), repo.as_str()));
                }
            }
        }

        Self::parse_full_name(input_str)
            .map_err(|_| format!("Invalid repository format: {}", input_str))
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn repo_name(&self) -> &RepositoryName {
        &self.repository_name
    }

    /// Returns the repository URL
    pub fn url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repository_name)
    }

    /// Returns the full name (owner/repository_name format)
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repository_name)
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repository_name)
    }
}

impl TryFrom<String> for RepositoryId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_full_name(&value)
    }
}

impl From<RepositoryId> for String {
    fn from(value: RepositoryId) -> Self {
        value.full_name()
    }
}

impl std::str::FromStr for RepositoryId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_url(&RepositoryUrl::new(s.to_string()))
    }
}

/// Validated repository record built from one upstream search item
///
/// Immutable once built. Only `full_name` and `description` take part in
/// classification; the remaining fields are carried for display and for
/// bookmarking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRepository {
    pub id: u64,
    pub full_name: RepositoryId,
    pub name: String,
    pub description: Option<String>,
    pub html_url: RepositoryUrl,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub topics: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CandidateRepository {
    /// Minimal record, mostly useful for classification and tests
    pub fn new(id: u64, full_name: RepositoryId, description: Option<String>) -> Self {
        Self {
            id,
            name: full_name.repository_name.to_string(),
            html_url: RepositoryUrl::new(full_name.url()),
            full_name,
            description,
            language: None,
            stargazers_count: 0,
            forks_count: 0,
            topics: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
