use crate::types::{CandidateRepository, PageLink, PageResult, page_links};

use super::{
    MarkdownContent, TimezoneOffset, format_date_with_timezone_offset, truncate_description,
};

/// One line per repository: name, stars, language and a short description
pub fn repository_markdown_light(repository: &CandidateRepository) -> MarkdownContent {
    let mut content = format!(
        "- **{}** ★{}",
        repository.full_name, repository.stargazers_count
    );

    if let Some(language) = &repository.language {
        content.push_str(&format!(" `{}`", language));
    }
    if let Some(description) = repository.description() {
        if !description.is_empty() {
            content.push_str(&format!(" {}", truncate_description(description)));
        }
    }
    content.push('\n');

    MarkdownContent(content)
}

/// Full repository section with description, topics and counters
pub fn repository_markdown_with_timezone(
    repository: &CandidateRepository,
    timezone: Option<&TimezoneOffset>,
) -> MarkdownContent {
    let mut content = String::new();

    content.push_str(&format!("## {}\n", repository.full_name));
    content.push_str(&format!("url: {}\n", repository.html_url));
    content.push_str(&format!(
        "language: {}\n",
        repository.language.as_deref().unwrap_or("-")
    ));
    content.push_str(&format!(
        "stars: {} | forks: {}\n",
        repository.stargazers_count, repository.forks_count
    ));

    if !repository.topics.is_empty() {
        let topics: Vec<String> = repository
            .topics
            .iter()
            .map(|t| format!("`{}`", t))
            .collect();
        content.push_str(&format!("topics: {}\n", topics.join(" ")));
    }

    if let Some(created_at) = repository.created_at {
        content.push_str(&format!(
            "created: {}\n",
            format_date_with_timezone_offset(created_at, timezone)
        ));
    }
    if let Some(updated_at) = repository.updated_at {
        content.push_str(&format!(
            "updated: {}\n",
            format_date_with_timezone_offset(updated_at, timezone)
        ));
    }

    if let Some(description) = repository.description() {
        content.push('\n');
        content.push_str(description);
        content.push('\n');
    }
    content.push('\n');

    MarkdownContent(content)
}

/// Pagination control as text, e.g. `1 … 8 9 [10] 11 12 … 20`
pub fn page_links_markdown(current: u32, total_pages: u32) -> String {
    page_links(current, total_pages)
        .into_iter()
        .map(|link| match link {
            PageLink::Page {
                number,
                current: true,
            } => format!("[{}]", number),
            PageLink::Page { number, .. } => number.to_string(),
            PageLink::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn catalog_page_markdown(
    result: &PageResult,
    rich: bool,
    timezone: Option<&TimezoneOffset>,
) -> MarkdownContent {
    let mut content = String::new();

    content.push_str(&format!(
        "# Catalog page {} of ~{}\n",
        result.page,
        result.total_pages()
    ));
    content.push_str(&format!(
        "~{} repositories (estimated from {} of {} examined)\n\n",
        result.estimated_total, result.kept, result.examined
    ));

    if result.items.is_empty() {
        content.push_str("*No repositories on this page*\n");
    }

    for repository in &result.items {
        let section = if rich {
            repository_markdown_with_timezone(repository, timezone)
        } else {
            repository_markdown_light(repository)
        };
        content.push_str(&section.0);
    }

    if result.budget_exhausted {
        content.push_str(
            "\n*Stopped early: too many repositories were filtered out, the page may be incomplete*\n",
        );
    }

    let links = page_links_markdown(result.page, result.total_pages());
    if !links.is_empty() {
        content.push_str(&format!("\npages: {}\n", links));
    }

    MarkdownContent(content)
}
