//! Bookmark management service
//!
//! Users bookmark catalog repositories, publicly or privately. Public
//! bookmarks make up the activity feed, the per-repository statistics and the
//! popularity ranking.

use std::path::Path;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::store::{StoreError, TomlStore};
use crate::types::{
    Bookmark, BookmarkFeed, BookmarkId, BookmarkedRepository, CandidateRepository,
    PopularRepository, RepositoryBookmarkStats, RepositoryId, UserId, UserSummary,
};

const BOOKMARKS_FILE: &str = "bookmarks.toml";

pub const DEFAULT_FEED_PAGE_SIZE: usize = 10;

/// Recent public bookmarks sampled for the popularity ranking
pub const DEFAULT_POPULAR_SAMPLE_SIZE: usize = 5;

/// Bookmarkers listed in repository statistics
const RECENT_BOOKMARKERS_LIMIT: usize = 3;

/// Bookmark service errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkServiceError {
    /// Bookmark id does not exist
    NotFound(String),
    /// Bookmark belongs to another user
    Forbidden(String),
    Store(StoreError),
}

impl std::fmt::Display for BookmarkServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Bookmark '{}' not found", id),
            Self::Forbidden(id) => write!(f, "Bookmark '{}' belongs to another user", id),
            Self::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BookmarkServiceError {}

impl From<StoreError> for BookmarkServiceError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BookmarkDocument {
    #[serde(default)]
    bookmarks: Vec<Bookmark>,
}

#[derive(Debug, Clone)]
pub struct BookmarkService {
    /// In-memory bookmarks, newest first
    bookmarks: Vec<Bookmark>,
    store: TomlStore,
}

impl BookmarkService {
    pub fn new(data_dir: &Path) -> Result<Self, BookmarkServiceError> {
        let store = TomlStore::open(data_dir, BOOKMARKS_FILE)?;
        let document: BookmarkDocument = store.load()?;

        let mut bookmarks = document.bookmarks;
        bookmarks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(Self { bookmarks, store })
    }

    /// Saves `bookmarks` and makes them current only once the write succeeded
    fn commit(&mut self, bookmarks: Vec<Bookmark>) -> Result<(), BookmarkServiceError> {
        let document = BookmarkDocument { bookmarks };
        self.store.save(&document)?;
        self.bookmarks = document.bookmarks;
        Ok(())
    }

    fn find(&self, user_id: &UserId, repo_id: u64) -> Option<&Bookmark> {
        self.bookmarks
            .iter()
            .find(|b| &b.user_id == user_id && b.repo.id == repo_id)
    }

    /// Bookmarks a repository; bookmarking it again returns the existing one
    pub fn add_bookmark(
        &mut self,
        user_id: &UserId,
        user: UserSummary,
        repository: &CandidateRepository,
        is_public: bool,
    ) -> Result<Bookmark, BookmarkServiceError> {
        if let Some(existing) = self.find(user_id, repository.id) {
            return Ok(existing.clone());
        }

        let bookmark = Bookmark {
            id: BookmarkId::generate(),
            user_id: user_id.clone(),
            user,
            repo: BookmarkedRepository::from(repository),
            created_at: Utc::now(),
            is_public,
        };

        let mut bookmarks = Vec::with_capacity(self.bookmarks.len() + 1);
        bookmarks.push(bookmark.clone());
        bookmarks.extend(self.bookmarks.iter().cloned());
        self.commit(bookmarks)?;

        info!("User {} bookmarked {}", user_id, repository.full_name);
        Ok(bookmark)
    }

    /// Returns whether a bookmark was removed
    pub fn remove_bookmark(
        &mut self,
        user_id: &UserId,
        repo_id: u64,
    ) -> Result<bool, BookmarkServiceError> {
        let remaining: Vec<Bookmark> = self
            .bookmarks
            .iter()
            .filter(|b| !(&b.user_id == user_id && b.repo.id == repo_id))
            .cloned()
            .collect();

        if remaining.len() == self.bookmarks.len() {
            return Ok(false);
        }

        self.commit(remaining)?;
        Ok(true)
    }

    pub fn is_bookmarked(&self, user_id: &UserId, repo_id: u64) -> bool {
        self.find(user_id, repo_id).is_some()
    }

    /// All bookmarks of a user, newest first
    pub fn user_bookmarks(&self, user_id: &UserId) -> Vec<Bookmark> {
        self.bookmarks
            .iter()
            .filter(|b| &b.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn update_privacy(
        &mut self,
        bookmark_id: &BookmarkId,
        user_id: &UserId,
        is_public: bool,
    ) -> Result<Bookmark, BookmarkServiceError> {
        let index = self
            .bookmarks
            .iter()
            .position(|b| &b.id == bookmark_id)
            .ok_or_else(|| BookmarkServiceError::NotFound(bookmark_id.to_string()))?;

        if &self.bookmarks[index].user_id != user_id {
            return Err(BookmarkServiceError::Forbidden(bookmark_id.to_string()));
        }

        let mut bookmarks = self.bookmarks.clone();
        bookmarks[index].is_public = is_public;
        let updated = bookmarks[index].clone();
        self.commit(bookmarks)?;
        Ok(updated)
    }

    fn feed<'a>(
        bookmarks: impl Iterator<Item = &'a Bookmark>,
        page_size: usize,
        before: Option<DateTime<Utc>>,
    ) -> BookmarkFeed {
        let page_size = page_size.max(1);
        let activities: Vec<Bookmark> = bookmarks
            .filter(|b| b.is_public)
            .filter(|b| before.is_none_or(|before| b.created_at < before))
            .take(page_size)
            .cloned()
            .collect();

        BookmarkFeed {
            last_visible: activities.last().map(|b| b.created_at),
            has_more: activities.len() == page_size,
            activities,
        }
    }

    /// Public bookmarks of everyone, newest first, strictly older than `before`
    pub fn public_feed(&self, page_size: usize, before: Option<DateTime<Utc>>) -> BookmarkFeed {
        Self::feed(self.bookmarks.iter(), page_size, before)
    }

    /// Public bookmarks of one user, newest first, strictly older than `before`
    pub fn user_feed(
        &self,
        user_id: &UserId,
        page_size: usize,
        before: Option<DateTime<Utc>>,
    ) -> BookmarkFeed {
        Self::feed(
            self.bookmarks.iter().filter(|b| &b.user_id == user_id),
            page_size,
            before,
        )
    }

    pub fn public_bookmark_count(&self, user_id: &UserId) -> usize {
        self.bookmarks
            .iter()
            .filter(|b| &b.user_id == user_id && b.is_public)
            .count()
    }

    /// GitHub id of a bookmarked repository, looked up by `owner/name`
    pub fn find_repository_id(&self, full_name: &RepositoryId) -> Option<u64> {
        self.bookmarks
            .iter()
            .find(|b| &b.repo.full_name == full_name)
            .map(|b| b.repo.id)
    }

    /// Total bookmarks of a repository and its most recent bookmarkers
    pub fn repository_stats(&self, repo_id: u64) -> RepositoryBookmarkStats {
        let bookmarks: Vec<&Bookmark> = self
            .bookmarks
            .iter()
            .filter(|b| b.repo.id == repo_id)
            .collect();

        RepositoryBookmarkStats {
            repo_id,
            repo: bookmarks.first().map(|b| b.repo.clone()),
            total_bookmarks: bookmarks.len(),
            recent_bookmarkers: bookmarks
                .iter()
                .filter(|b| b.is_public)
                .take(RECENT_BOOKMARKERS_LIMIT)
                .map(|b| b.user.clone())
                .collect(),
        }
    }

    /// Groups the `sample_size` most recent public bookmarks by repository,
    /// most bookmarked first, then most recently bookmarked
    pub fn popular_repositories(&self, sample_size: usize) -> Vec<PopularRepository> {
        let mut grouped: AHashMap<u64, PopularRepository> = AHashMap::new();

        for bookmark in self
            .bookmarks
            .iter()
            .filter(|b| b.is_public)
            .take(sample_size)
        {
            let entry = grouped
                .entry(bookmark.repo.id)
                .or_insert_with(|| PopularRepository {
                    repo: bookmark.repo.clone(),
                    bookmark_count: 0,
                    bookmarkers: Vec::new(),
                    last_bookmarked_at: bookmark.created_at,
                });
            entry.bookmark_count += 1;
            entry.bookmarkers.push(bookmark.user.clone());
        }

        let mut popular: Vec<PopularRepository> = grouped.into_values().collect();
        popular.sort_by(|a, b| {
            b.bookmark_count
                .cmp(&a.bookmark_count)
                .then_with(|| b.last_bookmarked_at.cmp(&a.last_bookmarked_at))
        });
        popular
    }
}
