//! TOML document persistence for catalog collections
//!
//! Each collection (languages, bookmarks, users, spotlights) is a single TOML
//! document in the data directory, read whole and rewritten whole on every
//! mutation. Writes go to a temporary file that is then renamed over the
//! document.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

const APP_DIR_NAME: &str = "repo-catalog";

/// Persistence errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// IO error during persistence
    IoError(String),
    /// Serialization error
    SerializationError(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "IO error: {}", msg),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// One TOML document on disk
#[derive(Debug, Clone)]
pub struct TomlStore {
    path: PathBuf,
}

impl TomlStore {
    /// Opens `file_name` inside `data_dir`, creating the directory if needed
    pub fn open(data_dir: &Path, file_name: &str) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| StoreError::IoError(format!("{}: {}", data_dir.display(), e)))?;
        Ok(Self {
            path: data_dir.join(file_name),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document; a missing file yields the default value
    pub fn load<T: DeserializeOwned + Default>(&self) -> Result<T, StoreError> {
        if !self.path.exists() {
            return Ok(T::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| StoreError::IoError(format!("{}: {}", self.path.display(), e)))?;

        toml::from_str(&content).map_err(|e| {
            StoreError::SerializationError(format!("{}: {}", self.path.display(), e))
        })
    }

    pub fn save<T: Serialize>(&self, value: &T) -> Result<(), StoreError> {
        let toml_content =
            toml::to_string(value).map_err(|e| StoreError::SerializationError(e.to_string()))?;

        let tmp_path = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp_path, toml_content)
            .map_err(|e| StoreError::IoError(format!("{}: {}", tmp_path.display(), e)))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| StoreError::IoError(format!("{}: {}", self.path.display(), e)))?;

        Ok(())
    }
}

/// Get the default data directory
///
/// Returns `~/.local/share/repo-catalog/` on Linux and the platform data
/// directory elsewhere.
pub fn default_data_dir() -> Result<PathBuf, StoreError> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        StoreError::IoError("Unable to determine the platform data directory".to_string())
    })?;

    Ok(data_dir.join(APP_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Document {
        names: Vec<String>,
    }

    #[test]
    fn test_missing_file_loads_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlStore::open(temp_dir.path(), "doc.toml").unwrap();
        let document: Document = store.load().unwrap();
        assert_eq!(document, Document::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b");
        let store = TomlStore::open(&nested, "doc.toml").unwrap();

        let document = Document {
            names: vec!["one".to_string(), "two".to_string()],
        };
        store.save(&document).unwrap();

        assert!(store.path().exists());
        assert!(!nested.join("doc.toml.tmp").exists());
        let loaded: Document = store.load().unwrap();
        assert_eq!(loaded, document);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlStore::open(temp_dir.path(), "doc.toml").unwrap();
        std::fs::write(store.path(), "names = [").unwrap();

        let result: Result<Document, _> = store.load();
        assert!(matches!(result, Err(StoreError::SerializationError(_))));
    }
}
