use std::path::Path;

use rmcp::{Error as McpError, model::*};

use super::text_result;
use crate::formatter::{
    TimezoneOffset, bookmark_feed_markdown_with_timezone,
    popular_repositories_markdown_with_timezone, repository_stats_markdown,
};
use crate::github::GitHubClient;
use crate::services::bookmarks::{DEFAULT_FEED_PAGE_SIZE, DEFAULT_POPULAR_SAMPLE_SIZE};
use crate::tools::functions;

/// Public bookmark activity, newest first
pub async fn get_public_bookmark_feed(
    data_dir: &Path,
    timezone: &Option<TimezoneOffset>,
    page_size: Option<usize>,
    before: Option<String>,
) -> Result<CallToolResult, McpError> {
    let feed = functions::bookmarks::public_feed(
        data_dir,
        page_size.unwrap_or(DEFAULT_FEED_PAGE_SIZE),
        before.as_deref(),
    )
    .map_err(|e| McpError::invalid_request(format!("{:#}", e), None))?;

    let mut content = vec![Content::text(
        bookmark_feed_markdown_with_timezone(&feed, timezone.as_ref()).0,
    )];
    if let (true, Some(last_visible)) = (feed.has_more, feed.last_visible) {
        content.push(Content::text(
            serde_json::json!({ "before": last_visible.to_rfc3339() }).to_string(),
        ));
    }

    Ok(text_result(content))
}

/// Repositories most bookmarked among the latest public bookmarks
pub async fn get_popular_repositories(
    data_dir: &Path,
    timezone: &Option<TimezoneOffset>,
    sample_size: Option<usize>,
) -> Result<CallToolResult, McpError> {
    let popular = functions::bookmarks::popular_repositories(
        data_dir,
        sample_size.unwrap_or(DEFAULT_POPULAR_SAMPLE_SIZE),
    )
    .map_err(|e| McpError::internal_error(format!("{:#}", e), None))?;

    Ok(text_result(vec![Content::text(
        popular_repositories_markdown_with_timezone(&popular, timezone.as_ref()).0,
    )]))
}

pub async fn get_repository_bookmark_stats(
    github_client: &GitHubClient,
    data_dir: &Path,
    repository: String,
) -> Result<CallToolResult, McpError> {
    let stats = functions::bookmarks::repository_stats(github_client, data_dir, &repository)
        .await
        .map_err(|e| McpError::internal_error(format!("{:#}", e), None))?;

    Ok(text_result(vec![Content::text(
        repository_stats_markdown(&stats).0,
    )]))
}
