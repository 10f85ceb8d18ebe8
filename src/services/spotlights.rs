//! Spotlight history
//!
//! Accepted spotlights are kept so the next curator reply can be checked
//! against the repositories featured in the last few rounds.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::store::{StoreError, TomlStore};
use crate::types::{RepositoryId, SPOTLIGHT_HISTORY_WINDOW, Spotlight};

const SPOTLIGHTS_FILE: &str = "spotlights.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SpotlightDocument {
    #[serde(default)]
    spotlights: Vec<Spotlight>,
}

#[derive(Debug, Clone)]
pub struct SpotlightService {
    /// Newest first
    spotlights: Vec<Spotlight>,
    store: TomlStore,
}

impl SpotlightService {
    pub fn new(data_dir: &Path) -> Result<Self, StoreError> {
        let store = TomlStore::open(data_dir, SPOTLIGHTS_FILE)?;
        let document: SpotlightDocument = store.load()?;

        let mut spotlights = document.spotlights;
        spotlights.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(Self { spotlights, store })
    }

    pub fn record(&mut self, spotlight: Spotlight) -> Result<(), StoreError> {
        info!(
            "Recording spotlight {} with {} repositories",
            spotlight.id,
            spotlight.repositories.len()
        );
        let mut spotlights = Vec::with_capacity(self.spotlights.len() + 1);
        spotlights.push(spotlight);
        spotlights.extend(self.spotlights.iter().cloned());

        let document = SpotlightDocument { spotlights };
        self.store.save(&document)?;
        self.spotlights = document.spotlights;
        Ok(())
    }

    pub fn latest(&self) -> Option<&Spotlight> {
        self.spotlights.first()
    }

    /// Repositories featured in the last [`SPOTLIGHT_HISTORY_WINDOW`] spotlights
    pub fn recently_featured(&self) -> Vec<RepositoryId> {
        let mut featured: Vec<RepositoryId> = Vec::new();
        for entry in self
            .spotlights
            .iter()
            .take(SPOTLIGHT_HISTORY_WINDOW)
            .flat_map(|s| s.repositories.iter())
        {
            if !featured.contains(&entry.full_name) {
                featured.push(entry.full_name.clone());
            }
        }
        featured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_spotlight_reply;
    use tempfile::TempDir;

    fn spotlight(full_names: &[&str]) -> Spotlight {
        let repositories: Vec<String> = full_names
            .iter()
            .map(|name| {
                format!(
                    r#"{{"full_name": "{}", "difficulty_level": "beginner"}}"#,
                    name
                )
            })
            .collect();
        let reply = format!(r#"{{"repositories": [{}]}}"#, repositories.join(","));
        let entries = parse_spotlight_reply(&reply, &[]).unwrap();
        Spotlight::new(entries, None, Vec::new())
    }

    #[test]
    fn test_record_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = SpotlightService::new(temp_dir.path()).unwrap();
        assert!(service.latest().is_none());

        service.record(spotlight(&["a/one", "a/two"])).unwrap();

        let reloaded = SpotlightService::new(temp_dir.path()).unwrap();
        let latest = reloaded.latest().unwrap();
        assert_eq!(latest.repositories.len(), 2);
        assert_eq!(latest.repositories[0].full_name.to_string(), "a/one");
    }

    #[test]
    fn test_recently_featured_uses_history_window() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = SpotlightService::new(temp_dir.path()).unwrap();

        service.record(spotlight(&["old/repo"])).unwrap();
        for _ in 0..SPOTLIGHT_HISTORY_WINDOW {
            service.record(spotlight(&["new/repo"])).unwrap();
        }

        let featured = service.recently_featured();
        assert_eq!(featured, vec![RepositoryId::new("new", "repo")]);
    }

    #[test]
    fn test_failed_save_is_not_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = SpotlightService::new(temp_dir.path()).unwrap();
        std::fs::create_dir(temp_dir.path().join(SPOTLIGHTS_FILE)).unwrap();

        assert!(service.record(spotlight(&["a/one"])).is_err());
        assert!(service.latest().is_none());
        assert!(service.recently_featured().is_empty());
    }
}
