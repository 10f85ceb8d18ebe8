//! Repository classifier
//!
//! Decides whether a candidate repository is excluded from the catalog. The
//! decision is a pure function of the repository's `owner/name`, its
//! description, and the immutable rule set the classifier was built with:
//!
//! 1. a blocklisted `owner/name` (exact, case-sensitive) is excluded;
//! 2. without a description nothing else can match, so it is kept;
//! 3. a description containing an absolute keyword is excluded;
//! 4. otherwise it is excluded when at least two of the suspicious
//!    categories (learning, libraries, meta) match.
//!
//! Keyword matching is a case-insensitive substring test.

use std::sync::Arc;

use ahash::AHashSet;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::types::CandidateRepository;

pub mod rules;

pub use rules::{ClassifierRules, RulesError, SuspiciousKeywords};

/// Suspicious categories needed to exclude a repository
const SUSPICIOUS_THRESHOLD: usize = 2;

static DEFAULT_CLASSIFIER: Lazy<Arc<Classifier>> =
    Lazy::new(|| Arc::new(Classifier::new(ClassifierRules::default())));

/// Shared classifier built from the built-in rules
pub fn default_classifier() -> Arc<Classifier> {
    DEFAULT_CLASSIFIER.clone()
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExclusionReason {
    Blocklisted,
    BlockedKeyword,
    SuspiciousCombination,
}

/// Full explanation of a classification decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub full_name: String,
    pub reason: Option<ExclusionReason>,
    pub is_blocked_repo: bool,
    pub blocked_keywords: Vec<String>,
    pub learning_matches: Vec<String>,
    pub library_matches: Vec<String>,
    pub meta_matches: Vec<String>,
}

impl Classification {
    pub fn is_excluded(&self) -> bool {
        self.reason.is_some()
    }

    /// Number of suspicious categories with at least one match
    pub fn suspicious_flags(&self) -> usize {
        [
            &self.learning_matches,
            &self.library_matches,
            &self.meta_matches,
        ]
        .iter()
        .filter(|matches| !matches.is_empty())
        .count()
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    blocked_repositories: AHashSet<String>,
    blocked_keywords: Vec<String>,
    learning: Vec<String>,
    libraries: Vec<String>,
    meta: Vec<String>,
}

/// Lower-cases keywords and drops empty ones, which would match everything
fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn any_match(description: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| description.contains(k.as_str()))
}

fn all_matches(description: &str, keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| description.contains(k.as_str()))
        .cloned()
        .collect()
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierRules::default())
    }
}

impl Classifier {
    pub fn new(rules: ClassifierRules) -> Self {
        Self {
            blocked_repositories: rules.blocked_repositories.into_iter().collect(),
            blocked_keywords: normalize_keywords(rules.blocked_keywords),
            learning: normalize_keywords(rules.suspicious.learning),
            libraries: normalize_keywords(rules.suspicious.libraries),
            meta: normalize_keywords(rules.suspicious.meta),
        }
    }

    /// Returns true when the repository must not appear in the catalog
    pub fn is_excluded(&self, full_name: &str, description: Option<&str>) -> bool {
        if self.blocked_repositories.contains(full_name) {
            return true;
        }

        let Some(description) = description else {
            return false;
        };
        let description = description.to_lowercase();

        if any_match(&description, &self.blocked_keywords) {
            return true;
        }

        let flags = [&self.learning, &self.libraries, &self.meta]
            .into_iter()
            .filter(|keywords| any_match(&description, keywords))
            .count();

        flags >= SUSPICIOUS_THRESHOLD
    }

    pub fn is_excluded_repository(&self, repository: &CandidateRepository) -> bool {
        self.is_excluded(&repository.full_name.full_name(), repository.description())
    }

    /// Same decision as [`Classifier::is_excluded`], with every matched keyword
    pub fn classify(&self, full_name: &str, description: Option<&str>) -> Classification {
        let is_blocked_repo = self.blocked_repositories.contains(full_name);
        let description = description.map(|d| d.to_lowercase()).unwrap_or_default();

        let mut classification = Classification {
            full_name: full_name.to_string(),
            reason: None,
            is_blocked_repo,
            blocked_keywords: all_matches(&description, &self.blocked_keywords),
            learning_matches: all_matches(&description, &self.learning),
            library_matches: all_matches(&description, &self.libraries),
            meta_matches: all_matches(&description, &self.meta),
        };

        classification.reason = if is_blocked_repo {
            Some(ExclusionReason::Blocklisted)
        } else if !classification.blocked_keywords.is_empty() {
            Some(ExclusionReason::BlockedKeyword)
        } else if classification.suspicious_flags() >= SUSPICIOUS_THRESHOLD {
            Some(ExclusionReason::SuspiciousCombination)
        } else {
            None
        };

        classification
    }

    pub fn classify_repository(&self, repository: &CandidateRepository) -> Classification {
        self.classify(&repository.full_name.full_name(), repository.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::default()
    }

    #[test]
    fn test_blocklisted_repository_is_excluded() {
        let c = classifier();
        assert!(c.is_excluded("golang/go", Some("The Go programming language")));
        assert!(c.is_excluded("golang/go", None));
        assert!(c.is_excluded("golang/go", Some("")));
    }

    #[test]
    fn test_blocklist_is_case_sensitive() {
        let c = classifier();
        assert!(c.is_excluded("microsoft/TypeScript", None));
        assert!(!c.is_excluded("microsoft/typescript", None));
        assert!(!c.is_excluded("Golang/go", None));
    }

    #[test]
    fn test_missing_description_is_kept() {
        let c = classifier();
        assert!(!c.is_excluded("someone/app", None));
        assert!(!c.is_excluded("someone/app", Some("")));
    }

    #[test]
    fn test_absolute_keywords_in_any_case() {
        let c = classifier();
        assert!(c.is_excluded("someone/app", Some("DEPRECATED: use the new one")));
        assert!(c.is_excluded("someone/app", Some("This repo was Archived")));
        assert!(c.is_excluded("someone/app", Some("Moved To gitlab")));
        assert!(c.is_excluded("someone/app", Some("No longer maintained.")));
    }

    #[test]
    fn test_single_suspicious_category_is_kept() {
        let c = classifier();
        assert!(!c.is_excluded("someone/go-tut", Some("A simple tutorial for learning Go")));
        assert!(!c.is_excluded("someone/kit", Some("A React UI kit")));
        assert!(!c.is_excluded("someone/tpl", Some("Project boilerplate")));
    }

    #[test]
    fn test_two_suspicious_categories_are_excluded() {
        let c = classifier();
        assert!(c.is_excluded(
            "someone/awesome-ds",
            Some("A curated list of awesome design systems and starter templates")
        ));
        assert!(c.is_excluded(
            "someone/course",
            Some("Course material with a starter project")
        ));
    }

    #[test]
    fn test_mixed_case_keywords_match() {
        let c = classifier();
        // "UI kit" and "ChatGPT prompt" are lower-cased before matching
        assert!(c.is_excluded(
            "someone/prompts",
            Some("ui kit plus chatgpt prompts")
        ));
    }

    #[test]
    fn test_is_excluded_is_deterministic() {
        let c = classifier();
        let description = Some("A curated list of tutorials");
        let first = c.is_excluded("a/b", description);
        for _ in 0..10 {
            assert_eq!(c.is_excluded("a/b", description), first);
        }
    }

    #[test]
    fn test_empty_rules_exclude_nothing() {
        let c = Classifier::new(ClassifierRules::empty());
        assert!(!c.is_excluded("golang/go", Some("deprecated tutorial boilerplate")));
    }

    #[test]
    fn test_empty_keywords_are_ignored() {
        let rules = ClassifierRules {
            blocked_repositories: Vec::new(),
            blocked_keywords: vec!["".to_string(), "  ".to_string()],
            suspicious: SuspiciousKeywords::default(),
        };
        let c = Classifier::new(rules);
        assert!(!c.is_excluded("a/b", Some("anything at all")));
    }

    #[test]
    fn test_classify_reports_matches() {
        let c = classifier();
        let result = c.classify(
            "someone/awesome-ds",
            Some("A curated list of awesome design systems and starter templates"),
        );
        assert_eq!(result.reason, Some(ExclusionReason::SuspiciousCombination));
        assert!(!result.is_blocked_repo);
        assert!(result.blocked_keywords.is_empty());
        assert!(result.learning_matches.is_empty());
        assert!(result.library_matches.contains(&"design system".to_string()));
        assert!(result.library_matches.contains(&"a curated list of".to_string()));
        assert!(result.meta_matches.contains(&"starter".to_string()));
        assert!(result.meta_matches.contains(&"template".to_string()));
        assert_eq!(result.suspicious_flags(), 2);
    }

    #[test]
    fn test_classify_reason_precedence() {
        let c = classifier();
        let result = c.classify("golang/go", Some("deprecated"));
        assert_eq!(result.reason, Some(ExclusionReason::Blocklisted));
        assert!(result.is_blocked_repo);
        assert_eq!(result.blocked_keywords, vec!["deprecated"]);

        let result = c.classify("a/b", Some("Archived tutorial boilerplate"));
        assert_eq!(result.reason, Some(ExclusionReason::BlockedKeyword));
    }

    #[test]
    fn test_classify_agrees_with_is_excluded() {
        let c = classifier();
        let cases = [
            ("golang/go", None),
            ("a/b", None),
            ("a/b", Some("A simple tutorial for learning Go")),
            ("a/b", Some("A curated list of awesome design systems and starter templates")),
            ("a/b", Some("no longer maintained")),
            ("a/b", Some("Interview questions and a learning roadmap")),
            ("a/b", Some("Fast web framework")),
        ];
        for (full_name, description) in cases {
            assert_eq!(
                c.classify(full_name, description).is_excluded(),
                c.is_excluded(full_name, description),
                "{} {:?}",
                full_name,
                description
            );
        }
    }

    #[test]
    fn test_exclusion_reason_strings() {
        assert_eq!(ExclusionReason::SuspiciousCombination.to_string(), "suspicious_combination");
        assert_eq!(
            "blocked_keyword".parse::<ExclusionReason>().unwrap(),
            ExclusionReason::BlockedKeyword
        );
    }

    #[test]
    fn test_default_classifier_is_shared() {
        let a = default_classifier();
        let b = default_classifier();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
