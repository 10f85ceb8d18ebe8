use rmcp::{Error as McpError, model::*};

use super::text_result;
use crate::classifier::Classifier;
use crate::formatter::{
    TimezoneOffset, classification_markdown, repository_markdown_with_timezone,
};
use crate::github::GitHubClient;
use crate::tools::functions;

/// Fetch a repository and report whether the catalog excludes it, and why
pub async fn check_repository(
    github_client: &GitHubClient,
    classifier: &Classifier,
    timezone: &Option<TimezoneOffset>,
    repository: String,
) -> Result<CallToolResult, McpError> {
    if repository.trim().is_empty() {
        return Err(McpError::invalid_request(
            "repository cannot be empty. Use 'owner/name' or a GitHub URL.".to_string(),
            None,
        ));
    }

    let (candidate, classification) =
        functions::catalog::check_repository(github_client, classifier, &repository)
            .await
            .map_err(|e| McpError::internal_error(format!("{:#}", e), None))?;

    Ok(text_result(vec![
        Content::text(classification_markdown(&classification).0),
        Content::text(repository_markdown_with_timezone(&candidate, timezone.as_ref()).0),
    ]))
}
