//! Filtered catalog paging
//!
//! GitHub has no notion of the catalog's exclusion rules, so a page of the
//! filtered catalog cannot be requested directly. [`CatalogService`] pages
//! through the upstream search from the first page, drops excluded
//! repositories, and slices the requested window out of what survives. The
//! filtered total is estimated from the observed keep-ratio.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::classifier::{Classifier, default_classifier};
use crate::github::{RepositorySearchExecutor, SEARCH_RESULT_CAP};
use crate::types::{CandidateRepository, DEFAULT_MIN_STARS, PageRequest, PageResult, SearchQuery};

/// Upper bound on upstream requests for a single page
pub const DEFAULT_MAX_BATCHES: u32 = 50;

/// Batches allowed per batch the page would need with nothing excluded
pub const DEFAULT_BATCH_BUDGET_FACTOR: u32 = 4;

/// Estimator tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSettings {
    pub min_stars: u32,
    pub max_batches: u32,
    pub batch_budget_factor: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            min_stars: DEFAULT_MIN_STARS,
            max_batches: DEFAULT_MAX_BATCHES,
            batch_budget_factor: DEFAULT_BATCH_BUDGET_FACTOR,
        }
    }
}

impl CatalogSettings {
    /// `min(max_batches, max(1, ceil(needed / batch_size)) * batch_budget_factor)`
    pub fn batch_budget(&self, request: &PageRequest) -> u32 {
        let batch_size = request.batch_size().max(1) as usize;
        let unfiltered_batches = request.needed().div_ceil(batch_size).max(1);
        let unfiltered_batches = u32::try_from(unfiltered_batches).unwrap_or(u32::MAX);

        unfiltered_batches
            .saturating_mul(self.batch_budget_factor.max(1))
            .min(self.max_batches.max(1))
    }
}

/// `floor(upstream_total * kept / examined)`, or 0 when nothing was examined
pub fn estimate_filtered_total(upstream_total: u64, kept: usize, examined: usize) -> u64 {
    if examined == 0 {
        return 0;
    }
    let estimate = upstream_total as u128 * kept as u128 / examined as u128;
    u64::try_from(estimate).unwrap_or(u64::MAX)
}

pub struct CatalogService<E: RepositorySearchExecutor> {
    executor: E,
    classifier: Arc<Classifier>,
    settings: CatalogSettings,
}

impl<E: RepositorySearchExecutor> CatalogService<E> {
    /// Catalog service with the built-in rules and default settings
    pub fn new(executor: E) -> Self {
        Self::with_classifier(executor, default_classifier(), CatalogSettings::default())
    }

    pub fn with_classifier(
        executor: E,
        classifier: Arc<Classifier>,
        settings: CatalogSettings,
    ) -> Self {
        Self {
            executor,
            classifier,
            settings,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// Fetches one page of the filtered catalog
    ///
    /// Upstream batches of `2 * per_page` are requested one after another
    /// from upstream page 1 until enough repositories survive the classifier,
    /// upstream runs out, or the batch budget is spent. Any upstream error
    /// fails the whole call and nothing collected so far is returned.
    pub async fn fetch_filtered_page(&self, request: &PageRequest) -> Result<PageResult> {
        let query = SearchQuery::for_catalog(
            self.settings.min_stars,
            request.language(),
            request.query(),
        );
        let batch_size = request.batch_size();
        let needed = request.needed();
        let budget = self.settings.batch_budget(request);

        let mut kept_items: Vec<CandidateRepository> = Vec::new();
        let mut upstream_total: u64 = 0;
        let mut examined: usize = 0;
        let mut batches: u32 = 0;
        let mut cursor: u32 = 1;
        let mut budget_exhausted = false;

        loop {
            let batch = self
                .executor
                .search_repositories(&query, cursor, batch_size)
                .await?;
            batches += 1;
            upstream_total = batch.total_count;
            examined += batch.received;

            let received = batch.received;
            let before = kept_items.len();
            kept_items.extend(
                batch
                    .items
                    .into_iter()
                    .filter(|repository| !self.classifier.is_excluded_repository(repository)),
            );

            debug!(
                "Batch {} (upstream page {}): received {}, kept {}, total kept {}/{}",
                batches,
                cursor,
                received,
                kept_items.len() - before,
                kept_items.len(),
                needed
            );

            if kept_items.len() >= needed {
                break;
            }
            if received < batch_size as usize {
                break;
            }
            if examined as u64 >= upstream_total.min(SEARCH_RESULT_CAP) {
                break;
            }
            if batches >= budget {
                warn!(
                    "Batch budget of {} spent for '{}' page {}: kept {} of {} needed",
                    budget,
                    query,
                    request.page(),
                    kept_items.len(),
                    needed
                );
                budget_exhausted = true;
                break;
            }

            cursor += 1;
        }

        let kept = kept_items.len();
        let items: Vec<CandidateRepository> = kept_items
            .into_iter()
            .skip(request.window_start())
            .take(request.per_page() as usize)
            .collect();
        let estimated_total = estimate_filtered_total(upstream_total, kept, examined);

        info!(
            "Catalog page {} for '{}': {} items, examined {}, kept {}, estimated total {}",
            request.page(),
            query,
            items.len(),
            examined,
            kept,
            estimated_total
        );

        Ok(PageResult {
            items,
            estimated_total,
            page: request.page(),
            per_page: request.per_page(),
            upstream_total,
            examined,
            kept,
            batches,
            budget_exhausted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierRules;
    use crate::types::{RepositoryId, SearchBatch};
    use std::sync::Mutex;

    /// Serves a fixed upstream result list in pages and records every call
    struct FakeExecutor {
        total_count: u64,
        repositories: Vec<CandidateRepository>,
        fail_on_page: Option<u32>,
        calls: Mutex<Vec<(String, u32, u32)>>,
    }

    impl FakeExecutor {
        fn new(total_count: u64, repositories: Vec<CandidateRepository>) -> Self {
            Self {
                total_count,
                repositories,
                fail_on_page: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, u32, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RepositorySearchExecutor for &FakeExecutor {
        async fn search_repositories(
            &self,
            query: &SearchQuery,
            page: u32,
            per_page: u32,
        ) -> Result<SearchBatch> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), page, per_page));

            if self.fail_on_page == Some(page) {
                anyhow::bail!("upstream rate limit");
            }

            let start = (page as usize - 1) * per_page as usize;
            let items: Vec<CandidateRepository> = self
                .repositories
                .iter()
                .skip(start)
                .take(per_page as usize)
                .cloned()
                .collect();

            Ok(SearchBatch {
                total_count: self.total_count,
                received: items.len(),
                items,
            })
        }
    }

    /// Serves full batches of excluded repositories forever
    struct EndlessExcludedExecutor {
        calls: Mutex<u32>,
    }

    impl RepositorySearchExecutor for &EndlessExcludedExecutor {
        async fn search_repositories(
            &self,
            _query: &SearchQuery,
            page: u32,
            per_page: u32,
        ) -> Result<SearchBatch> {
            *self.calls.lock().unwrap() += 1;
            let items: Vec<CandidateRepository> = (0..per_page)
                .map(|i| deprecated(page as u64 * 1000 + i as u64))
                .collect();
            Ok(SearchBatch {
                total_count: 1_000_000,
                received: items.len(),
                items,
            })
        }
    }

    fn repository(id: u64) -> CandidateRepository {
        CandidateRepository::new(
            id,
            RepositoryId::new("owner", format!("repo-{}", id)),
            Some("A fast tool".to_string()),
        )
    }

    fn deprecated(id: u64) -> CandidateRepository {
        CandidateRepository::new(
            id,
            RepositoryId::new("owner", format!("old-{}", id)),
            Some("Deprecated, use something else".to_string()),
        )
    }

    fn ids(result: &PageResult) -> Vec<u64> {
        result.items.iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn test_clean_batch_keeps_upstream_total() {
        let executor = FakeExecutor::new(500, (1..=30).map(repository).collect());
        let service = CatalogService::new(&executor);

        let result = service
            .fetch_filtered_page(&PageRequest::default())
            .await
            .unwrap();

        assert_eq!(ids(&result), (1..=12).collect::<Vec<_>>());
        assert_eq!(result.estimated_total, 500);
        assert_eq!(result.examined, 24);
        assert_eq!(result.kept, 24);
        assert_eq!(result.batches, 1);
        assert!(!result.budget_exhausted);
        assert_eq!(
            executor.calls(),
            vec![("stars:>1000".to_string(), 1, 24)]
        );
    }

    #[tokio::test]
    async fn test_everything_excluded_stops_at_budget() {
        let executor = EndlessExcludedExecutor {
            calls: Mutex::new(0),
        };
        let service = CatalogService::new(&executor);

        let result = service
            .fetch_filtered_page(&PageRequest::default())
            .await
            .unwrap();

        assert!(result.items.is_empty());
        assert!(result.budget_exhausted);
        assert_eq!(result.estimated_total, 0);
        assert_eq!(result.batches, DEFAULT_BATCH_BUDGET_FACTOR);
        assert_eq!(*executor.calls.lock().unwrap(), DEFAULT_BATCH_BUDGET_FACTOR);
    }

    #[tokio::test]
    async fn test_short_batch_ends_paging() {
        let executor = FakeExecutor::new(5, (1..=5).map(repository).collect());
        let service = CatalogService::new(&executor);

        let result = service
            .fetch_filtered_page(&PageRequest::default())
            .await
            .unwrap();

        assert_eq!(result.items.len(), 5);
        assert_eq!(result.batches, 1);
        assert_eq!(result.estimated_total, 5);
        assert!(!result.has_next_page());
    }

    #[tokio::test]
    async fn test_page_beyond_results_is_empty() {
        let executor = FakeExecutor::new(5, (1..=5).map(repository).collect());
        let service = CatalogService::new(&executor);

        let result = service
            .fetch_filtered_page(&PageRequest::new(Some(3), None, None))
            .await
            .unwrap();

        assert!(result.items.is_empty());
        assert_eq!(result.estimated_total, 5);
    }

    #[tokio::test]
    async fn test_excluded_items_are_skipped_and_estimate_scaled() {
        // Every third repository is deprecated
        let repositories: Vec<CandidateRepository> = (1..=60)
            .map(|id| if id % 3 == 0 { deprecated(id) } else { repository(id) })
            .collect();
        let executor = FakeExecutor::new(1000, repositories);
        let service = CatalogService::new(&executor);

        let request = PageRequest::new(Some(2), Some(10), None);
        let result = service.fetch_filtered_page(&request).await.unwrap();

        // Survivors: 1,2,4,5,7,8,10,11,13,14 | 16,17,19,20,22,23,25,26,28,29
        assert_eq!(
            ids(&result),
            vec![16, 17, 19, 20, 22, 23, 25, 26, 28, 29]
        );
        // Two batches of 20 examined, 14 + 13 kept
        assert_eq!(result.examined, 40);
        assert_eq!(result.kept, 27);
        assert_eq!(result.estimated_total, 675);
        assert_eq!(
            executor
                .calls()
                .iter()
                .map(|(_, page, per_page)| (*page, *per_page))
                .collect::<Vec<_>>(),
            vec![(1, 20), (2, 20)]
        );
    }

    #[tokio::test]
    async fn test_estimate_is_floored() {
        let mut repositories: Vec<CandidateRepository> = (1..=2).map(repository).collect();
        repositories.push(deprecated(3));
        let executor = FakeExecutor::new(10, repositories);
        let service = CatalogService::new(&executor);

        let result = service
            .fetch_filtered_page(&PageRequest::default())
            .await
            .unwrap();

        // 10 * 2 / 3 = 6.67
        assert_eq!(result.estimated_total, 6);
    }

    #[tokio::test]
    async fn test_upstream_error_discards_partial_results() {
        let repositories: Vec<CandidateRepository> = (1..=100)
            .map(|id| if id % 4 == 0 { repository(id) } else { deprecated(id) })
            .collect();
        let mut executor = FakeExecutor::new(100, repositories);
        executor.fail_on_page = Some(2);
        let service = CatalogService::new(&executor);

        let result = service.fetch_filtered_page(&PageRequest::default()).await;

        assert!(result.is_err());
        assert_eq!(executor.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_search_result_cap_stops_paging() {
        // Upstream claims far more than it will serve
        let repositories: Vec<CandidateRepository> = (1..=2000)
            .map(|id| if id % 25 == 0 { repository(id) } else { deprecated(id) })
            .collect();
        let executor = FakeExecutor::new(50_000, repositories);
        let settings = CatalogSettings {
            max_batches: 100,
            batch_budget_factor: 100,
            ..CatalogSettings::default()
        };
        let service = CatalogService::with_classifier(&executor, default_classifier(), settings);

        let request = PageRequest::new(Some(1), Some(50), None);
        let result = service.fetch_filtered_page(&request).await.unwrap();

        assert_eq!(result.examined, 1000);
        assert_eq!(result.batches, 10);
        assert_eq!(result.kept, 40);
        assert!(!result.budget_exhausted);
    }

    #[tokio::test]
    async fn test_language_and_query_reach_upstream() {
        let executor = FakeExecutor::new(0, Vec::new());
        let service = CatalogService::new(&executor);

        let request =
            PageRequest::new(None, Some(5), Some("Rust")).with_query(Some("http".to_string()));
        let result = service.fetch_filtered_page(&request).await.unwrap();

        assert!(result.items.is_empty());
        assert_eq!(result.estimated_total, 0);
        assert_eq!(
            executor.calls(),
            vec![("http stars:>1000 language:rust".to_string(), 1, 10)]
        );
    }

    #[tokio::test]
    async fn test_custom_rules_apply() {
        let executor = FakeExecutor::new(3, (1..=3).map(repository).collect());
        let rules = ClassifierRules {
            blocked_repositories: vec!["owner/repo-2".to_string()],
            ..ClassifierRules::empty()
        };
        let settings = CatalogSettings {
            min_stars: 10,
            ..CatalogSettings::default()
        };
        let service =
            CatalogService::with_classifier(&executor, Arc::new(Classifier::new(rules)), settings);

        let result = service
            .fetch_filtered_page(&PageRequest::default())
            .await
            .unwrap();

        assert_eq!(ids(&result), vec![1, 3]);
        assert_eq!(result.estimated_total, 2);
        assert_eq!(executor.calls()[0].0, "stars:>10");
    }

    #[test]
    fn test_batch_budget() {
        let settings = CatalogSettings::default();
        assert_eq!(settings.batch_budget(&PageRequest::default()), 4);
        // page 5 of 12 needs 60 items, 3 batches of 24
        assert_eq!(
            settings.batch_budget(&PageRequest::new(Some(5), None, None)),
            12
        );
        assert_eq!(
            settings.batch_budget(&PageRequest::new(Some(40), None, None)),
            DEFAULT_MAX_BATCHES
        );
    }

    #[test]
    fn test_estimate_filtered_total() {
        assert_eq!(estimate_filtered_total(1000, 0, 0), 0);
        assert_eq!(estimate_filtered_total(1000, 24, 24), 1000);
        assert_eq!(estimate_filtered_total(7, 1, 2), 3);
        assert_eq!(estimate_filtered_total(u64::MAX, 1, 1), u64::MAX);
    }
}
