use anyhow::{Context, Result};

use crate::classifier::{Classification, Classifier};
use crate::github::{GitHubClient, RepositorySearchExecutor};
use crate::services::CatalogService;
use crate::types::{CandidateRepository, PageRequest, PageResult, RepositoryId};

/// Parses `owner/name`, a GitHub URL or an SSH remote
pub fn parse_repository_reference(input: &str) -> Result<RepositoryId> {
    input
        .parse::<RepositoryId>()
        .map_err(|e| anyhow::anyhow!("Invalid repository '{}': {}", input, e))
}

/// Normalizes caller input into a [`PageRequest`] and fetches the page
pub async fn list_catalog_page<E: RepositorySearchExecutor>(
    catalog: &CatalogService<E>,
    page: Option<u32>,
    per_page: Option<u32>,
    language: Option<&str>,
    query: Option<String>,
) -> Result<PageResult> {
    let request = PageRequest::new(page, per_page, language).with_query(query);
    catalog.fetch_filtered_page(&request).await
}

/// Fetches a repository and explains whether the catalog would show it
pub async fn check_repository(
    github_client: &GitHubClient,
    classifier: &Classifier,
    repository: &str,
) -> Result<(CandidateRepository, Classification)> {
    let repository_id = parse_repository_reference(repository)?;
    let candidate = github_client
        .fetch_repository(&repository_id)
        .await
        .with_context(|| format!("Failed to check {}", repository_id))?;

    let classification = classifier.classify_repository(&candidate);
    Ok((candidate, classification))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repository_reference() {
        let expected = RepositoryId::new("tokio-rs", "tokio");
        assert_eq!(parse_repository_reference("tokio-rs/tokio").unwrap(), expected);
        assert_eq!(
            parse_repository_reference("https://github.com/tokio-rs/tokio").unwrap(),
            expected
        );
        assert_eq!(
            parse_repository_reference("git@github.com:tokio-rs/tokio.git").unwrap(),
            expected
        );
        assert!(parse_repository_reference("tokio").is_err());
    }
}
