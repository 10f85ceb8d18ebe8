//! Language filter management
//!
//! Languages are contributed by users and offered as catalog filters. Reads
//! go through a [`LanguageCache`] that keeps the list for a fixed time and is
//! invalidated whenever a language is added.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::store::{StoreError, TomlStore};
use crate::types::{Language, UserId};

const LANGUAGES_FILE: &str = "languages.toml";

/// How long a loaded language list is served without reloading
pub const LANGUAGE_CACHE_TTL_SECS: i64 = 5 * 60;

/// Source of the current time, injectable for tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CachedLanguages {
    languages: Vec<Language>,
    loaded_at: DateTime<Utc>,
}

/// Time-expiring cache of the language list
#[derive(Debug, Clone)]
pub struct LanguageCache<C: Clock = SystemClock> {
    clock: C,
    ttl: Duration,
    entry: Option<CachedLanguages>,
}

impl Default for LanguageCache<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock, Duration::seconds(LANGUAGE_CACHE_TTL_SECS))
    }
}

impl<C: Clock> LanguageCache<C> {
    pub fn new(clock: C, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entry: None,
        }
    }

    /// The cached list, if it is younger than the TTL
    pub fn get(&self) -> Option<&[Language]> {
        let entry = self.entry.as_ref()?;
        if self.clock.now() - entry.loaded_at < self.ttl {
            Some(&entry.languages)
        } else {
            None
        }
    }

    pub fn store(&mut self, languages: Vec<Language>) {
        self.entry = Some(CachedLanguages {
            languages,
            loaded_at: self.clock.now(),
        });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Serves the cached list, or calls `load` when it is missing, expired or
    /// `force_refresh` is set
    pub fn get_or_load<E, F>(&mut self, force_refresh: bool, load: F) -> Result<Vec<Language>, E>
    where
        F: FnOnce() -> Result<Vec<Language>, E>,
    {
        if !force_refresh {
            if let Some(languages) = self.get() {
                debug!("Serving {} languages from cache", languages.len());
                return Ok(languages.to_vec());
            }
        }

        let languages = load()?;
        self.store(languages.clone());
        Ok(languages)
    }
}

/// Language service errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageServiceError {
    AlreadyExists(String),
    InvalidName(String),
    Store(StoreError),
}

impl std::fmt::Display for LanguageServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists(name) => write!(f, "Language already exists: '{}'", name),
            Self::InvalidName(name) => write!(f, "Invalid language name: '{}'", name),
            Self::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LanguageServiceError {}

impl From<StoreError> for LanguageServiceError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LanguageDocument {
    #[serde(default)]
    languages: Vec<Language>,
}

/// Language list persisted in the data directory, read through a cache
#[derive(Debug, Clone)]
pub struct LanguageService<C: Clock = SystemClock> {
    store: TomlStore,
    cache: LanguageCache<C>,
}

impl LanguageService<SystemClock> {
    pub fn new(data_dir: &Path) -> Result<Self, LanguageServiceError> {
        Self::with_cache(data_dir, LanguageCache::default())
    }
}

impl<C: Clock> LanguageService<C> {
    pub fn with_cache(data_dir: &Path, cache: LanguageCache<C>) -> Result<Self, LanguageServiceError> {
        Ok(Self {
            store: TomlStore::open(data_dir, LANGUAGES_FILE)?,
            cache,
        })
    }

    fn load_sorted(store: &TomlStore) -> Result<Vec<Language>, LanguageServiceError> {
        let document: LanguageDocument = store.load()?;
        let mut languages = document.languages;
        languages.sort_by_key(|l| l.name.to_lowercase());
        Ok(languages)
    }

    /// Languages ordered by name
    pub fn list_languages(&mut self, force_refresh: bool) -> Result<Vec<Language>, LanguageServiceError> {
        let store = &self.store;
        self.cache
            .get_or_load(force_refresh, || Self::load_sorted(store))
    }

    /// Adds a language; names are trimmed and must be unique
    pub fn add_language(
        &mut self,
        name: &str,
        added_by: Option<UserId>,
    ) -> Result<Language, LanguageServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LanguageServiceError::InvalidName(name.to_string()));
        }

        let mut document: LanguageDocument = self.store.load()?;
        if document.languages.iter().any(|l| l.name == name) {
            return Err(LanguageServiceError::AlreadyExists(name.to_string()));
        }

        let language = Language::new(name.to_string(), added_by);
        document.languages.push(language.clone());
        self.store.save(&document)?;
        self.cache.invalidate();

        info!("Added language '{}'", language.name);
        Ok(language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone)]
    struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Arc::new(Mutex::new(Utc::now())))
        }

        fn advance(&self, duration: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += duration;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn cache(clock: &ManualClock) -> LanguageCache<ManualClock> {
        LanguageCache::new(clock.clone(), Duration::minutes(5))
    }

    #[test]
    fn test_cache_serves_until_ttl() {
        let clock = ManualClock::new();
        let mut cache = cache(&clock);
        let mut loads = 0;

        for _ in 0..3 {
            let languages = cache
                .get_or_load(false, || -> Result<_, ()> {
                    loads += 1;
                    Ok(vec![Language::new("Rust".to_string(), None)])
                })
                .unwrap();
            assert_eq!(languages.len(), 1);
        }
        assert_eq!(loads, 1);

        clock.advance(Duration::minutes(4));
        assert!(cache.get().is_some());

        clock.advance(Duration::minutes(1));
        assert!(cache.get().is_none());

        cache
            .get_or_load(false, || -> Result<_, ()> {
                loads += 1;
                Ok(Vec::new())
            })
            .unwrap();
        assert_eq!(loads, 2);
    }

    #[test]
    fn test_cache_force_refresh_and_invalidate() {
        let clock = ManualClock::new();
        let mut cache = cache(&clock);
        cache.store(vec![Language::new("Go".to_string(), None)]);

        let refreshed = cache
            .get_or_load(true, || -> Result<_, ()> { Ok(Vec::new()) })
            .unwrap();
        assert!(refreshed.is_empty());

        cache.invalidate();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_cache_load_error_keeps_cache_empty() {
        let clock = ManualClock::new();
        let mut cache = cache(&clock);
        let result = cache.get_or_load(false, || Err("boom"));
        assert_eq!(result, Err("boom"));
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_add_and_list_languages() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = LanguageService::new(temp_dir.path()).unwrap();

        assert!(service.list_languages(false).unwrap().is_empty());

        service
            .add_language("TypeScript", Some(UserId::from("user-1")))
            .unwrap();
        service.add_language(" go ", None).unwrap();

        let names: Vec<String> = service
            .list_languages(false)
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["go", "TypeScript"]);
    }

    #[test]
    fn test_duplicate_language_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = LanguageService::new(temp_dir.path()).unwrap();

        service.add_language("Rust", None).unwrap();
        let result = service.add_language("Rust", None);
        assert_eq!(
            result,
            Err(LanguageServiceError::AlreadyExists("Rust".to_string()))
        );
        assert!(matches!(
            service.add_language("   ", None),
            Err(LanguageServiceError::InvalidName(_))
        ));
    }

    #[test]
    fn test_only_empty_names_are_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let mut service = LanguageService::new(temp_dir.path()).unwrap();

        let long_name = "Ä".repeat(40);
        let added = service.add_language(&format!("  {}  ", long_name), None).unwrap();
        assert_eq!(added.name, long_name);
    }

    #[test]
    fn test_cache_hides_external_changes_until_expiry() {
        let temp_dir = TempDir::new().unwrap();
        let clock = ManualClock::new();
        let mut reader =
            LanguageService::with_cache(temp_dir.path(), cache(&clock)).unwrap();
        let mut writer = LanguageService::new(temp_dir.path()).unwrap();

        assert!(reader.list_languages(false).unwrap().is_empty());
        writer.add_language("Zig", None).unwrap();

        assert!(reader.list_languages(false).unwrap().is_empty());
        assert_eq!(reader.list_languages(true).unwrap().len(), 1);

        writer.add_language("Nim", None).unwrap();
        clock.advance(Duration::minutes(6));
        assert_eq!(reader.list_languages(false).unwrap().len(), 2);
    }
}
