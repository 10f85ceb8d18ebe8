use crate::tools::{CatalogTools, CatalogToolsConfig};
use anyhow::Result;
use rmcp::ServiceExt;
use rmcp::transport::stdio;

/// Runs the MCP server in STDIN/STDOUT mode.
///
/// This mode is used when the server is launched as a subprocess by an MCP client,
/// communicating through standard input/output streams.
///
/// # Example
/// ```no_run
/// # use repo_catalog::tools::CatalogToolsConfig;
/// # use repo_catalog::transport::stdio::run_stdio_server;
/// # async fn example() -> anyhow::Result<()> {
/// run_stdio_server(CatalogToolsConfig {
///     github_token: Some("ghp_xxxxxxxxxxxx".to_string()),
///     ..Default::default()
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_stdio_server(config: CatalogToolsConfig) -> Result<()> {
    let service = CatalogTools::new(config)?;
    service.initialize().await?;

    let server = service.serve(stdio()).await?;

    server.waiting().await?;
    Ok(())
}
