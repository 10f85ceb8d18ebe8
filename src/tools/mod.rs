//! MCP (Model Context Protocol) tool implementations for the repository catalog
//!
//! Exposes the filtered catalog, the classifier, the language list and the
//! public bookmark activity as tools for AI assistants and other MCP clients.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rmcp::{Error as McpError, ServerHandler, model::*, tool};
use tokio::sync::Mutex;

use crate::classifier::{Classifier, ClassifierRules, default_classifier};
use crate::formatter::TimezoneOffset;
use crate::github::GitHubClient;
use crate::services::{CatalogSettings, LanguageService, default_data_dir};

/// Tool function implementations organized by functionality
pub mod functions;

/// Argument handling and markdown rendering for each MCP tool
pub mod tools_interface;

/// Start-up options shared by every transport
#[derive(Debug, Clone, Default)]
pub struct CatalogToolsConfig {
    pub github_token: Option<String>,
    pub timezone: Option<String>,
    pub data_dir: Option<PathBuf>,
    /// TOML rules file replacing the built-in classifier rules
    pub rules_path: Option<PathBuf>,
    pub min_stars: Option<u32>,
    pub request_timeout: Option<Duration>,
}

/// Wrapper for the catalog tools exposed through the MCP protocol
#[derive(Clone)]
pub struct CatalogTools {
    github_token: Option<String>,
    timezone: Option<TimezoneOffset>,
    request_timeout: Option<Duration>,
    data_dir: PathBuf,
    classifier: Arc<Classifier>,
    settings: CatalogSettings,
    /// Shared so the language cache lives across calls and sessions
    languages: Arc<Mutex<LanguageService>>,
}

impl CatalogTools {
    /// Resolves the data directory, loads the classifier rules and opens the
    /// language list
    pub fn new(config: CatalogToolsConfig) -> Result<Self> {
        let data_dir = match config.data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        let classifier = match &config.rules_path {
            Some(path) => {
                let rules = ClassifierRules::load(path)
                    .with_context(|| format!("Failed to load rules from {}", path.display()))?;
                Arc::new(Classifier::new(rules))
            }
            None => default_classifier(),
        };

        let mut settings = CatalogSettings::default();
        if let Some(min_stars) = config.min_stars {
            settings.min_stars = min_stars;
        }

        let languages = LanguageService::new(&data_dir)?;

        Ok(Self {
            github_token: config.github_token,
            timezone: config.timezone.and_then(|tz| TimezoneOffset::parse(&tz)),
            request_timeout: config.request_timeout,
            data_dir,
            classifier,
            settings,
            languages: Arc::new(Mutex::new(languages)),
        })
    }

    /// Checks the data directory is readable and warms the language cache
    pub async fn initialize(&self) -> Result<()> {
        tracing::info!("Initializing CatalogTools...");
        tracing::info!("Using data directory: {}", self.data_dir.display());

        let languages = functions::languages::list_languages(&self.languages, true).await?;
        tracing::info!(
            "CatalogTools initialization complete ({} languages, min stars {})",
            languages.len(),
            self.settings.min_stars
        );
        Ok(())
    }

    fn github_client(&self) -> Result<GitHubClient, McpError> {
        GitHubClient::new(self.github_token.clone(), self.request_timeout).map_err(|e| {
            McpError::internal_error(format!("Failed to create GitHub client: {}", e), None)
        })
    }
}

#[tool(tool_box)]
impl CatalogTools {
    #[tool(
        description = "List one page of the curated repository catalog. Popular GitHub repositories (sorted by stars) with language runtimes, frameworks, tutorials, curated lists and dead projects filtered out. The total is an estimate. Examples: `{}`, `{\"page\": 2, \"per_page\": 20, \"language\": \"rust\"}`, `{\"query\": \"terminal\", \"output_option\": \"rich\"}`"
    )]
    async fn list_catalog_page(
        &self,
        #[tool(param)]
        #[schemars(description = "1-based page number (default: 1)")]
        page: Option<u32>,
        #[tool(param)]
        #[schemars(description = "Repositories per page (default: 12, max: 50)")]
        per_page: Option<u32>,
        #[tool(param)]
        #[schemars(
            description = "Optional language filter, e.g. 'rust', 'typescript'. 'all' means no filter"
        )]
        language: Option<String>,
        #[tool(param)]
        #[schemars(description = "Optional free-text search, e.g. 'terminal emulator'")]
        query: Option<String>,
        #[tool(param)]
        #[schemars(description = "Output format (light/rich, default: light)")]
        #[schemars(default)]
        output_option: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        tools_interface::list_catalog_page::list_catalog_page(
            self.github_client()?,
            self.classifier.clone(),
            self.settings,
            &self.timezone,
            page,
            per_page,
            language,
            query,
            output_option,
        )
        .await
    }

    #[tool(
        description = "Fetch a repository from GitHub and explain whether the catalog excludes it: blocklist, dead-project keywords, or a combination of tutorial/library/list keywords. Examples: `{\"repository\": \"excalidraw/excalidraw\"}`, `{\"repository\": \"https://github.com/sindresorhus/awesome\"}`"
    )]
    async fn check_repository(
        &self,
        #[tool(param)]
        #[schemars(description = "Repository as 'owner/name' or GitHub URL")]
        repository: String,
    ) -> Result<CallToolResult, McpError> {
        tools_interface::check_repository::check_repository(
            &self.github_client()?,
            &self.classifier,
            &self.timezone,
            repository,
        )
        .await
    }

    #[tool(
        description = "List the languages offered as catalog filters. Use the filter value as the `language` of list_catalog_page."
    )]
    async fn list_languages(
        &self,
        #[tool(param)]
        #[schemars(description = "Reload from disk instead of using the cached list")]
        #[schemars(default)]
        force_refresh: Option<bool>,
    ) -> Result<CallToolResult, McpError> {
        tools_interface::list_languages::list_languages(&self.languages, force_refresh).await
    }

    #[tool(
        description = "Add a language to the catalog filters. Names are unique. Example: `{\"name\": \"Elixir\"}`"
    )]
    async fn add_language(
        &self,
        #[tool(param)]
        #[schemars(description = "Language name as GitHub spells it, e.g. 'Elixir'")]
        name: String,
        #[tool(param)]
        #[schemars(description = "Optional id of the user adding the language")]
        added_by: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        tools_interface::list_languages::add_language(&self.languages, name, added_by).await
    }

    #[tool(
        description = "Recent public bookmarks of all users, newest first. Pass the returned `before` value to get the next page. Examples: `{}`, `{\"page_size\": 20, \"before\": \"2024-05-01T12:00:00+00:00\"}`"
    )]
    async fn get_public_bookmark_feed(
        &self,
        #[tool(param)]
        #[schemars(description = "Bookmarks per page (default: 10)")]
        page_size: Option<usize>,
        #[tool(param)]
        #[schemars(description = "RFC 3339 cursor; only bookmarks strictly older are returned")]
        before: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        tools_interface::bookmark_activity::get_public_bookmark_feed(
            &self.data_dir,
            &self.timezone,
            page_size,
            before,
        )
        .await
    }

    #[tool(
        description = "Repositories bookmarked most often among the latest public bookmarks. Examples: `{}`, `{\"sample_size\": 20}`"
    )]
    async fn get_popular_repositories(
        &self,
        #[tool(param)]
        #[schemars(description = "Number of latest public bookmarks to rank (default: 5)")]
        sample_size: Option<usize>,
    ) -> Result<CallToolResult, McpError> {
        tools_interface::bookmark_activity::get_popular_repositories(
            &self.data_dir,
            &self.timezone,
            sample_size,
        )
        .await
    }

    #[tool(
        description = "Bookmark count and recent bookmarkers of one repository. Examples: `{\"repository\": \"excalidraw/excalidraw\"}`, `{\"repository\": \"123456\"}`"
    )]
    async fn get_repository_bookmark_stats(
        &self,
        #[tool(param)]
        #[schemars(description = "Repository as 'owner/name', GitHub URL or numeric id")]
        repository: String,
    ) -> Result<CallToolResult, McpError> {
        tools_interface::bookmark_activity::get_repository_bookmark_stats(
            &self.github_client()?,
            &self.data_dir,
            repository,
        )
        .await
    }
}

#[tool(tool_box)]
impl ServerHandler for CatalogTools {
    fn get_info(&self) -> ServerInfo {
        let auth_status = match &self.github_token {
            Some(_) => "Authenticated with GitHub token",
            None => "Not authenticated (search rate limits apply)",
        };

        let instructions = format!(
            r#"Repository Catalog MCP Server - {}

## Overview
A curated catalog of popular GitHub repositories (more than {} stars). Language runtimes, frameworks, documentation repositories, tutorials, awesome-lists and unmaintained projects are filtered out, so totals are estimates.

## Available Tools

### 1. list_catalog_page
One page of the filtered catalog.
```json
{{"name": "list_catalog_page", "arguments": {{"page": 1, "per_page": 12, "language": "rust"}}}}
```

### 2. check_repository
Why a repository is or is not in the catalog.
```json
{{"name": "check_repository", "arguments": {{"repository": "sindresorhus/awesome"}}}}
```

### 3. list_languages
Languages usable as the `language` filter.

### 4. add_language
Add a language filter; duplicate names are rejected.

### 5. get_public_bookmark_feed
Latest public bookmarks; page with the returned `before` cursor.

### 6. get_popular_repositories
Most bookmarked repositories among recent public bookmarks.

### 7. get_repository_bookmark_stats
Bookmark count and recent bookmarkers of one repository.
"#,
            auth_status, self.settings.min_stars
        );

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(instructions),
        }
    }
}
