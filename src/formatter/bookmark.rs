use crate::types::{
    Bookmark, BookmarkFeed, PopularRepository, RepositoryBookmarkStats, UserSummary,
};

use super::{
    MarkdownContent, TimezoneOffset, format_datetime_with_timezone_offset, truncate_description,
};

fn names(users: &[UserSummary]) -> String {
    users
        .iter()
        .map(|u| u.display_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn bookmark_markdown_with_timezone(
    bookmark: &Bookmark,
    timezone: Option<&TimezoneOffset>,
) -> MarkdownContent {
    let mut content = format!(
        "- **{}** ★{} `{}` by {} at {}",
        bookmark.repo.full_name,
        bookmark.repo.stargazers_count,
        bookmark.repo.language,
        bookmark.user.display_name,
        format_datetime_with_timezone_offset(bookmark.created_at, timezone)
    );
    if !bookmark.is_public {
        content.push_str(" [private]");
    }
    content.push_str(&format!(" (id: {})\n", bookmark.id));

    if !bookmark.repo.description.is_empty() {
        content.push_str(&format!(
            "  {}\n",
            truncate_description(&bookmark.repo.description)
        ));
    }

    MarkdownContent(content)
}

pub fn bookmarks_markdown_with_timezone(
    bookmarks: &[Bookmark],
    timezone: Option<&TimezoneOffset>,
) -> MarkdownContent {
    let mut content = format!("# Bookmarks ({})\n", bookmarks.len());
    for bookmark in bookmarks {
        content.push_str(&bookmark_markdown_with_timezone(bookmark, timezone).0);
    }
    MarkdownContent(content)
}

pub fn bookmark_feed_markdown_with_timezone(
    feed: &BookmarkFeed,
    timezone: Option<&TimezoneOffset>,
) -> MarkdownContent {
    let mut content = String::from("# Recent activity\n");

    if feed.activities.is_empty() {
        content.push_str("*No public bookmarks*\n");
    }
    for bookmark in &feed.activities {
        content.push_str(&bookmark_markdown_with_timezone(bookmark, timezone).0);
    }

    if let (true, Some(last_visible)) = (feed.has_more, feed.last_visible) {
        content.push_str(&format!("\nmore before: {}\n", last_visible.to_rfc3339()));
    }

    MarkdownContent(content)
}

pub fn repository_stats_markdown(stats: &RepositoryBookmarkStats) -> MarkdownContent {
    let mut content = String::new();

    match &stats.repo {
        Some(repo) => content.push_str(&format!("# {}\n", repo.full_name)),
        None if stats.repo_id == 0 => content.push_str("# Unknown repository\n"),
        None => content.push_str(&format!("# Repository {}\n", stats.repo_id)),
    }
    content.push_str(&format!("bookmarks: {}\n", stats.total_bookmarks));
    if !stats.recent_bookmarkers.is_empty() {
        content.push_str(&format!(
            "recently bookmarked by: {}\n",
            names(&stats.recent_bookmarkers)
        ));
    }

    MarkdownContent(content)
}

pub fn popular_repositories_markdown_with_timezone(
    popular: &[PopularRepository],
    timezone: Option<&TimezoneOffset>,
) -> MarkdownContent {
    let mut content = String::from("# Popular repositories\n");

    if popular.is_empty() {
        content.push_str("*Nothing bookmarked recently*\n");
    }
    for (rank, entry) in popular.iter().enumerate() {
        content.push_str(&format!(
            "{}. **{}** `{}` {} bookmark(s), last {}\n",
            rank + 1,
            entry.repo.full_name,
            entry.repo.language,
            entry.bookmark_count,
            format_datetime_with_timezone_offset(entry.last_bookmarked_at, timezone)
        ));
        content.push_str(&format!("   by {}\n", names(&entry.bookmarkers)));
    }

    MarkdownContent(content)
}
