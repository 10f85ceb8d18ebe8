//! Catalog page request/result types and pagination links

use serde::{Deserialize, Serialize};

use super::{CandidateRepository, LanguageFilter};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 12;

/// Largest page size whose double still fits GitHub's 100 items per request
pub const MAX_PER_PAGE: u32 = 50;

/// Pages shown on each side of the current page in [`page_links`]
const PAGE_LINK_DELTA: u32 = 2;

/// One filtered catalog page as requested by a caller
///
/// Only built through [`PageRequest::new`], so `page >= 1` and
/// `1 <= per_page <= MAX_PER_PAGE` always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
    language: Option<LanguageFilter>,
    query: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            language: None,
            query: None,
        }
    }
}

impl PageRequest {
    /// Normalizes caller input: missing or zero values fall back to the
    /// defaults, `per_page` is clamped to [`MAX_PER_PAGE`], and `"all"` means
    /// no language filter.
    pub fn new(page: Option<u32>, per_page: Option<u32>, language: Option<&str>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let per_page = per_page
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PER_PAGE)
            .min(MAX_PER_PAGE);

        Self {
            page,
            per_page,
            language: language.and_then(LanguageFilter::parse),
            query: None,
        }
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.trim().is_empty());
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn language(&self) -> Option<&LanguageFilter> {
        self.language.as_ref()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Upstream batch size, twice the page size
    pub fn batch_size(&self) -> u32 {
        self.per_page * 2
    }

    /// Number of kept items needed to fill every page up to this one
    pub fn needed(&self) -> usize {
        self.page as usize * self.per_page as usize
    }

    /// Start of the requested window in the filtered sequence
    pub fn window_start(&self) -> usize {
        (self.page as usize).saturating_sub(1) * self.per_page as usize
    }
}

/// Result of one filtered page fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<CandidateRepository>,
    /// Advisory estimate of the filtered total
    pub estimated_total: u64,
    pub page: u32,
    pub per_page: u32,
    pub upstream_total: u64,
    /// Items examined across all batches
    pub examined: usize,
    /// Items that survived the classifier across all batches
    pub kept: usize,
    pub batches: u32,
    /// Whether the fetch stopped because the batch budget ran out
    pub budget_exhausted: bool,
}

impl PageResult {
    /// `ceil(estimated_total / per_page)`
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let pages = self.estimated_total.div_ceil(self.per_page as u64);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Entry of a pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLink {
    Page { number: u32, current: bool },
    Ellipsis,
}

/// Layout of a pagination control
///
/// Always shows the first page, a window of two pages on each side of the
/// current one, ellipses for the gaps, and the last page.
pub fn page_links(current: u32, total_pages: u32) -> Vec<PageLink> {
    if total_pages == 0 {
        return Vec::new();
    }

    let current = current.clamp(1, total_pages);
    let page = |number: u32| PageLink::Page {
        number,
        current: number == current,
    };

    let mut links = vec![page(1)];

    if current > PAGE_LINK_DELTA + 2 {
        links.push(PageLink::Ellipsis);
    }

    let start = current.saturating_sub(PAGE_LINK_DELTA).max(2);
    let end = (current + PAGE_LINK_DELTA).min(total_pages - 1);
    for number in start..=end {
        links.push(page(number));
    }

    if current + PAGE_LINK_DELTA < total_pages - 1 {
        links.push(PageLink::Ellipsis);
    }

    if total_pages > 1 {
        links.push(page(total_pages));
    }

    links
}
