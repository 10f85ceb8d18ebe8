use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::warn;

use super::catalog::parse_repository_reference;
use crate::github::GitHubClient;
use crate::services::BookmarkService;
use crate::types::{BookmarkFeed, PopularRepository, RepositoryBookmarkStats};

/// Parses a feed cursor, an RFC 3339 timestamp as returned in `last_visible`
pub fn parse_feed_cursor(before: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    before
        .map(|value| {
            DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("Invalid feed cursor '{}', expected RFC 3339", value))
        })
        .transpose()
}

pub fn public_feed(
    data_dir: &Path,
    page_size: usize,
    before: Option<&str>,
) -> Result<BookmarkFeed> {
    let before = parse_feed_cursor(before)?;
    let bookmarks = BookmarkService::new(data_dir)?;
    Ok(bookmarks.public_feed(page_size, before))
}

pub fn popular_repositories(data_dir: &Path, sample_size: usize) -> Result<Vec<PopularRepository>> {
    let bookmarks = BookmarkService::new(data_dir)?;
    Ok(bookmarks.popular_repositories(sample_size))
}

/// Bookmark statistics for a numeric repository id, `owner/name` or URL
///
/// Names that were never bookmarked are resolved through GitHub to get the
/// repository id. A name GitHub cannot resolve has no bookmarks either, so it
/// yields empty statistics instead of an error.
pub async fn repository_stats(
    github_client: &GitHubClient,
    data_dir: &Path,
    repository: &str,
) -> Result<RepositoryBookmarkStats> {
    let bookmarks = BookmarkService::new(data_dir)?;

    let repo_id = match repository.trim().parse::<u64>() {
        Ok(id) => id,
        Err(_) => {
            let repository_id = parse_repository_reference(repository)?;
            match bookmarks.find_repository_id(&repository_id) {
                Some(id) => id,
                None => match github_client.fetch_repository(&repository_id).await {
                    Ok(candidate) => candidate.id,
                    Err(e) => {
                        warn!(
                            "Could not resolve {}, reporting no bookmarks: {:#}",
                            repository_id, e
                        );
                        return Ok(RepositoryBookmarkStats::default());
                    }
                },
            }
        }
    };

    Ok(bookmarks.repository_stats(repo_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_feed_cursor() {
        assert_eq!(parse_feed_cursor(None).unwrap(), None);
        assert_eq!(
            parse_feed_cursor(Some("2024-05-01T14:00:00+02:00")).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
        assert!(parse_feed_cursor(Some("yesterday")).is_err());
    }
}
