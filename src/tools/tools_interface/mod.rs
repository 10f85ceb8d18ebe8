//! MCP-facing wrappers: parse tool arguments, call [`super::functions`] and
//! render the result as markdown content

pub mod bookmark_activity;
pub mod check_repository;
pub mod list_catalog_page;
pub mod list_languages;

fn text_result(content: Vec<rmcp::model::Content>) -> rmcp::model::CallToolResult {
    rmcp::model::CallToolResult {
        content,
        is_error: Some(false),
    }
}
