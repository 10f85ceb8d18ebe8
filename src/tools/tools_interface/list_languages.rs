use rmcp::{Error as McpError, model::*};
use tokio::sync::Mutex;

use super::text_result;
use crate::formatter::languages_markdown;
use crate::services::LanguageService;
use crate::tools::functions;
use crate::types::UserId;

/// List the languages offered as catalog filters
pub async fn list_languages(
    languages: &Mutex<LanguageService>,
    force_refresh: Option<bool>,
) -> Result<CallToolResult, McpError> {
    let languages = functions::languages::list_languages(languages, force_refresh.unwrap_or(false))
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;

    Ok(text_result(vec![Content::text(languages_markdown(&languages).0)]))
}

pub async fn add_language(
    languages: &Mutex<LanguageService>,
    name: String,
    added_by: Option<String>,
) -> Result<CallToolResult, McpError> {
    let language = functions::languages::add_language(
        languages,
        &name,
        added_by.map(UserId::from),
    )
    .await
    .map_err(|e| McpError::invalid_request(e.to_string(), None))?;

    Ok(text_result(vec![Content::text(format!(
        "Added language **{}** (filter: `{}`)",
        language.name,
        language.filter_value()
    ))]))
}
