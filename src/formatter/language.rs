use crate::types::Language;

use super::MarkdownContent;

pub fn languages_markdown(languages: &[Language]) -> MarkdownContent {
    let mut content = String::from("# Languages\n");
    if languages.is_empty() {
        content.push_str("*No languages yet*\n");
    }
    for language in languages {
        content.push_str(&format!(
            "- {} (filter: `{}`)\n",
            language.name,
            language.filter_value()
        ));
    }
    MarkdownContent(content)
}
