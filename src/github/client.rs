use crate::github::error::ApiError;
use crate::github::response::{parse_repository, parse_search_response};
use crate::types::{CandidateRepository, RepositoryId, SearchBatch, SearchQuery};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use serde::Serialize;
use tokio::time::Duration;
use tracing::{error, info};

/// Most results GitHub serves for one search, whatever `total_count` says
pub const SEARCH_RESULT_CAP: u64 = 1000;

/// Largest `per_page` the search endpoint accepts
pub const MAX_SEARCH_PER_PAGE: u32 = 100;

/// Repositories fetched concurrently by [`GitHubClient::fetch_repositories`]
const REPOSITORY_FETCH_CONCURRENCY: usize = 8;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Seam between the catalog and the upstream search
///
/// One call is one upstream request for one page of results; implementations
/// must not retry.
pub trait RepositorySearchExecutor {
    #[allow(async_fn_in_trait)]
    async fn search_repositories(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
    ) -> Result<SearchBatch>;
}

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    sort: &'static str,
    order: &'static str,
    page: u32,
    per_page: u32,
}

#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) client: octocrab::Octocrab,
    request_timeout: Duration,
}

impl GitHubClient {
    pub fn new(token: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        Self::configure(None, token, timeout)
    }

    /// Client for a GitHub-compatible API at another base URL
    pub fn with_base_uri(
        base_uri: &str,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Self::configure(Some(base_uri), token, timeout)
    }

    fn configure(
        base_uri: Option<&str>,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Octocrab::builder();

        if let Some(base_uri) = base_uri {
            builder = builder
                .base_uri(base_uri)
                .with_context(|| format!("Invalid GitHub base URI: {}", base_uri))?;
        }

        if let Some(token) = token {
            builder = builder.personal_token(token);
        }

        let timeout_duration = timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let connection_timeout = if timeout_duration < Duration::from_secs(10) {
            std::cmp::max(timeout_duration, Duration::from_secs(1))
        } else {
            Duration::from_secs(30)
        };

        let read_write_timeout = std::cmp::max(timeout_duration, Duration::from_secs(1));

        builder = builder
            .add_retry_config(RetryConfig::None)
            .set_connect_timeout(Some(connection_timeout))
            .set_read_timeout(Some(read_write_timeout))
            .set_write_timeout(Some(read_write_timeout));

        let client = builder.build().context("Failed to build GitHub client")?;

        Ok(Self {
            client,
            request_timeout: read_write_timeout,
        })
    }

    /// Single GET returning raw JSON, bounded by the request timeout
    async fn get_json<P: Serialize + ?Sized>(
        &self,
        route: &str,
        params: Option<&P>,
    ) -> std::result::Result<serde_json::Value, ApiError> {
        let start_time = std::time::Instant::now();

        let response = tokio::time::timeout(
            self.request_timeout,
            self.client.get::<serde_json::Value, _, _>(route, params),
        )
        .await
        .map_err(|_| {
            let duration = start_time.elapsed();
            error!("GitHub request {} timed out after {:?}", route, duration);
            ApiError::Transport(format!("Request timed out after {:?}", duration))
        })?
        .map_err(ApiError::from_octocrab_error)?;

        info!(
            "GitHub request {} completed in {:?}",
            route,
            start_time.elapsed()
        );
        Ok(response)
    }

    /// Fetches one repository by `owner/name`
    pub async fn fetch_repository(&self, repository_id: &RepositoryId) -> Result<CandidateRepository> {
        let route = format!(
            "/repos/{}/{}",
            urlencoding::encode(repository_id.owner.as_str()),
            urlencoding::encode(repository_id.repository_name.as_str())
        );

        let value = self
            .get_json::<()>(&route, None)
            .await
            .with_context(|| format!("Failed to fetch repository {}", repository_id))?;

        parse_repository(value)
    }

    /// Fetches several repositories concurrently, keeping the input order
    ///
    /// Failed lookups are logged and left out of the result.
    pub async fn fetch_repositories(
        &self,
        repository_ids: &[RepositoryId],
    ) -> Vec<CandidateRepository> {
        let results: Vec<Result<CandidateRepository>> = stream::iter(repository_ids)
            .map(|repository_id| self.fetch_repository(repository_id))
            .buffered(REPOSITORY_FETCH_CONCURRENCY)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|result| match result {
                Ok(repository) => Some(repository),
                Err(e) => {
                    tracing::warn!("Failed to fetch repository: {:#}", e);
                    None
                }
            })
            .collect()
    }
}

impl RepositorySearchExecutor for GitHubClient {
    async fn search_repositories(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
    ) -> Result<SearchBatch> {
        let params = SearchParams {
            q: query.as_str(),
            sort: "stars",
            order: "desc",
            page,
            per_page: per_page.clamp(1, MAX_SEARCH_PER_PAGE),
        };

        info!(
            "Searching repositories: q='{}' page={} per_page={}",
            params.q, params.page, params.per_page
        );

        let value = self
            .get_json("/search/repositories", Some(&params))
            .await
            .with_context(|| format!("Repository search failed for '{}' page {}", query, page))?;

        parse_search_response(value)
    }
}
