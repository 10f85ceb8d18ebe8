use crate::types::{Spotlight, SpotlightEntry};

use super::{MarkdownContent, TimezoneOffset, format_datetime_with_timezone_offset};

pub fn spotlight_entry_markdown(entry: &SpotlightEntry) -> MarkdownContent {
    let mut content = String::new();

    content.push_str(&format!(
        "## {} [{}]\n",
        entry.full_name, entry.difficulty_level
    ));
    if let Some(language) = &entry.language {
        content.push_str(&format!("language: {}\n", language));
    }
    if let Some(description) = &entry.description {
        content.push_str(&format!("{}\n", description));
    }
    if !entry.ai_reasoning.is_empty() {
        content.push_str(&format!("\nwhy: {}\n", entry.ai_reasoning));
    }
    if !entry.suggested_features.is_empty() {
        content.push_str("\nideas:\n");
        for feature in &entry.suggested_features {
            content.push_str(&format!("- {}\n", feature));
        }
    }
    content.push('\n');

    MarkdownContent(content)
}

pub fn spotlight_markdown_with_timezone(
    spotlight: &Spotlight,
    timezone: Option<&TimezoneOffset>,
) -> MarkdownContent {
    let mut content = format!(
        "# Spotlight {}\n",
        format_datetime_with_timezone_offset(spotlight.timestamp, timezone)
    );

    if let Some(notes) = &spotlight.curator_notes {
        content.push_str(&format!("{}\n", notes));
    }
    content.push('\n');

    for entry in &spotlight.repositories {
        content.push_str(&spotlight_entry_markdown(entry).0);
    }

    if !spotlight.previously_excluded.is_empty() {
        let excluded: Vec<String> = spotlight
            .previously_excluded
            .iter()
            .map(|id| id.to_string())
            .collect();
        content.push_str(&format!("skipped (featured recently): {}\n", excluded.join(", ")));
    }

    MarkdownContent(content)
}
