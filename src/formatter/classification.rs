use crate::classifier::Classification;

use super::MarkdownContent;

fn matches_line(label: &str, matches: &[String]) -> String {
    if matches.is_empty() {
        format!("- {}: -\n", label)
    } else {
        format!("- {}: {}\n", label, matches.join(", "))
    }
}

/// Explains a classification decision
pub fn classification_markdown(classification: &Classification) -> MarkdownContent {
    let mut content = String::new();

    content.push_str(&format!("# {}\n", classification.full_name));
    match classification.reason {
        Some(reason) => content.push_str(&format!("**excluded** ({})\n\n", reason)),
        None => content.push_str("**kept**\n\n"),
    }

    content.push_str(&format!(
        "- blocklisted: {}\n",
        if classification.is_blocked_repo { "yes" } else { "no" }
    ));
    content.push_str(&matches_line("blocked keywords", &classification.blocked_keywords));
    content.push_str(&matches_line("learning", &classification.learning_matches));
    content.push_str(&matches_line("libraries", &classification.library_matches));
    content.push_str(&matches_line("meta", &classification.meta_matches));
    content.push_str(&format!(
        "- suspicious categories: {}/3\n",
        classification.suspicious_flags()
    ));

    MarkdownContent(content)
}
