use std::sync::Arc;

use rmcp::{Error as McpError, model::*};

use super::text_result;
use crate::classifier::Classifier;
use crate::formatter::{TimezoneOffset, catalog_page_markdown};
use crate::github::GitHubClient;
use crate::services::{CatalogService, CatalogSettings};
use crate::tools::functions;
use crate::types::OutputOption;

/// List one page of the filtered catalog
///
/// Returns the page as markdown followed by the raw page metadata as JSON so
/// clients can build their own pagination.
#[allow(clippy::too_many_arguments)]
pub async fn list_catalog_page(
    github_client: GitHubClient,
    classifier: Arc<Classifier>,
    settings: CatalogSettings,
    timezone: &Option<TimezoneOffset>,
    page: Option<u32>,
    per_page: Option<u32>,
    language: Option<String>,
    query: Option<String>,
    output_option: Option<String>,
) -> Result<CallToolResult, McpError> {
    let format = match output_option {
        Some(option_str) => option_str
            .parse::<OutputOption>()
            .map_err(|e| McpError::invalid_request(e, None))?,
        None => OutputOption::default(),
    };

    let catalog = CatalogService::with_classifier(github_client, classifier, settings);
    let result =
        functions::catalog::list_catalog_page(&catalog, page, per_page, language.as_deref(), query)
            .await
            .map_err(|e| McpError::internal_error(format!("{:#}", e), None))?;

    let markdown = catalog_page_markdown(
        &result,
        format == OutputOption::Rich,
        timezone.as_ref(),
    );

    let metadata = serde_json::json!({
        "page": result.page,
        "per_page": result.per_page,
        "estimated_total": result.estimated_total,
        "total_pages": result.total_pages(),
        "has_next_page": result.has_next_page(),
        "budget_exhausted": result.budget_exhausted,
    });

    Ok(text_result(vec![
        Content::text(markdown.0),
        Content::text(metadata.to_string()),
    ]))
}
