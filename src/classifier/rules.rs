//! Exclusion rule sets
//!
//! The built-in lists keep the catalog focused on real applications: the
//! blocklist removes language runtimes, frameworks and documentation repos
//! by name, the absolute keywords remove dead projects, and the suspicious
//! sets catch learning material, component libraries and curated lists.

use std::path::Path;

use serde::{Deserialize, Serialize};

const BLOCKED_REPOSITORIES: &[&str] = &[
    "golang/go",
    "python/cpython",
    "nodejs/node",
    "rust-lang/rust",
    "facebook/react",
    "facebook/react-native",
    "vuejs/vue",
    "twbs/bootstrap",
    "tailwindlabs/tailwindcss",
    "mui/material-ui",
    "ant-design/ant-design",
    "tensorflow/tensorflow",
    "flutter/flutter",
    "vercel/next.js",
    "expo/expo",
    "storybookjs/storybook",
    "storybookjs/storybook-design-system",
    "storybookjs/storybook-addon-design-assets",
    "preactjs/preact",
    "curl/curl",
    "freeCodeCamp/freeCodeCamp",
    "codecademy/docs",
    "kamranahmedse/developer-roadmap",
    "getify/You-Dont-Know-JS",
    "FreeCodeCampChina/freecodecamp.cn",
    "sindresorhus/awesome",
    "EbookFoundation/free-programming-books",
    "public-apis/public-apis",
    "microsoft/TypeScript",
    "mdn/content",
    "docker/docs",
    "vuejs/docs",
];

const BLOCKED_KEYWORDS: &[&str] = &[
    "deprecated",
    "archived",
    "moved to",
    "no longer maintained",
];

const LEARNING_KEYWORDS: &[&str] = &[
    "course",
    "guide",
    "tutorial",
    "learn",
    "curriculum",
    "roadmap",
];

const LIBRARY_KEYWORDS: &[&str] = &[
    "UI library",
    "UI framework",
    "UI components",
    "UI kit",
    "component library",
    "style guide",
    "design system",
    "design tokens",
    "design pattern",
    "design pattern library",
    "a list of",
    "a collection of",
    "a curated list of",
    "interview handbook",
    "interview preparation",
    "interview questions",
    "interview tips",
];

const META_KEYWORDS: &[&str] = &[
    "awesome list",
    "collection of",
    "list of",
    "curated list",
    "template",
    "starter kit",
    "boilerplate",
    "starter",
    "starter project",
    "starter code",
    "starter template",
    "ChatGPT prompt",
];

/// Keyword sets that only exclude a repository in combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SuspiciousKeywords {
    #[serde(default)]
    pub learning: Vec<String>,
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(default)]
    pub meta: Vec<String>,
}

/// Complete rule set as written in a rules file
///
/// ```toml
/// blocked_repositories = ["golang/go"]
/// blocked_keywords = ["deprecated"]
///
/// [suspicious]
/// learning = ["tutorial"]
/// libraries = ["UI kit"]
/// meta = ["boilerplate"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRules {
    #[serde(default)]
    pub blocked_repositories: Vec<String>,
    #[serde(default)]
    pub blocked_keywords: Vec<String>,
    #[serde(default)]
    pub suspicious: SuspiciousKeywords,
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            blocked_repositories: to_strings(BLOCKED_REPOSITORIES),
            blocked_keywords: to_strings(BLOCKED_KEYWORDS),
            suspicious: SuspiciousKeywords {
                learning: to_strings(LEARNING_KEYWORDS),
                libraries: to_strings(LIBRARY_KEYWORDS),
                meta: to_strings(META_KEYWORDS),
            },
        }
    }
}

/// Rules file errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    IoError(String),
    ParseError(String),
}

impl std::fmt::Display for RulesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "Failed to read rules file: {}", msg),
            Self::ParseError(msg) => write!(f, "Failed to parse rules file: {}", msg),
        }
    }
}

impl std::error::Error for RulesError {}

impl ClassifierRules {
    /// Rule set that excludes nothing
    pub fn empty() -> Self {
        Self {
            blocked_repositories: Vec::new(),
            blocked_keywords: Vec::new(),
            suspicious: SuspiciousKeywords::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RulesError> {
        toml::from_str(content).map_err(|e| RulesError::ParseError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RulesError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = ClassifierRules::default();
        assert_eq!(rules.blocked_repositories.len(), 32);
        assert!(rules.blocked_repositories.contains(&"golang/go".to_string()));
        assert_eq!(rules.blocked_keywords.len(), 4);
        assert_eq!(rules.suspicious.learning.len(), 6);
        assert_eq!(rules.suspicious.libraries.len(), 17);
        assert_eq!(rules.suspicious.meta.len(), 12);
    }

    #[test]
    fn test_rules_from_toml() {
        let rules = ClassifierRules::from_toml_str(
            r#"
blocked_repositories = ["owner/repo"]

[suspicious]
meta = ["boilerplate"]
"#,
        )
        .unwrap();

        assert_eq!(rules.blocked_repositories, vec!["owner/repo"]);
        assert!(rules.blocked_keywords.is_empty());
        assert!(rules.suspicious.learning.is_empty());
        assert_eq!(rules.suspicious.meta, vec!["boilerplate"]);
    }

    #[test]
    fn test_rules_from_invalid_toml() {
        let result = ClassifierRules::from_toml_str("blocked_repositories = 3");
        assert!(matches!(result, Err(RulesError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ClassifierRules::load(Path::new("/nonexistent/rules.toml"));
        assert!(matches!(result, Err(RulesError::IoError(_))));
    }
}
