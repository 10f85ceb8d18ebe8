//! Bookmark, activity feed and bookmark statistics types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CandidateRepository, RepositoryId, RepositoryUrl, UserId, UserSummary};

/// Language shown for repositories GitHub reports none for
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BookmarkId(String);

impl BookmarkId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BookmarkId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Snapshot of the repository taken when it was bookmarked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookmarkedRepository {
    pub id: u64,
    pub name: String,
    pub full_name: RepositoryId,
    pub description: String,
    pub html_url: RepositoryUrl,
    pub language: String,
    pub stargazers_count: u64,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl From<&CandidateRepository> for BookmarkedRepository {
    fn from(repo: &CandidateRepository) -> Self {
        Self {
            id: repo.id,
            name: repo.name.clone(),
            full_name: repo.full_name.clone(),
            description: repo.description.clone().unwrap_or_default(),
            html_url: repo.html_url.clone(),
            language: repo
                .language
                .clone()
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
            stargazers_count: repo.stargazers_count,
            topics: repo.topics.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub user_id: UserId,
    pub user: UserSummary,
    pub repo: BookmarkedRepository,
    pub created_at: DateTime<Utc>,
    pub is_public: bool,
}

/// One page of the bookmark activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkFeed {
    pub activities: Vec<Bookmark>,
    /// Pass back as `before` to fetch the next page
    pub last_visible: Option<DateTime<Utc>>,
    pub has_more: bool,
}

/// `repo_id` is 0 when the repository could not be resolved
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryBookmarkStats {
    pub repo_id: u64,
    pub repo: Option<BookmarkedRepository>,
    pub total_bookmarks: usize,
    pub recent_bookmarkers: Vec<UserSummary>,
}

/// Repository grouped out of the recent public bookmarks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularRepository {
    pub repo: BookmarkedRepository,
    pub bookmark_count: usize,
    pub bookmarkers: Vec<UserSummary>,
    pub last_bookmarked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bookmarked_repository_defaults() {
        let repo = CandidateRepository::new(7, RepositoryId::new("a", "b"), None);
        let snapshot = BookmarkedRepository::from(&repo);
        assert_eq!(snapshot.description, "");
        assert_eq!(snapshot.language, UNKNOWN_LANGUAGE);
        assert_eq!(snapshot.full_name.to_string(), "a/b");
    }
}
