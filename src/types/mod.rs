//! Core type system and domain definitions
//!
//! Strongly-typed identifiers and records for the catalog: validated
//! repositories, search batches, page requests/results, languages, bookmarks,
//! user profiles and spotlights.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod bookmark;
pub mod language;
pub mod page;
pub mod repository;
pub mod search;
pub mod spotlight;
pub mod user;

pub use bookmark::*;
pub use language::*;
pub use page::*;
pub use repository::*;
pub use search::*;
pub use spotlight::*;
pub use user::*;

/// Output format options for catalog listings
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputOption {
    /// One line per repository
    #[default]
    Light,
    /// Description, topics and counters for each repository
    Rich,
}

impl std::str::FromStr for OutputOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(OutputOption::Light),
            "rich" => Ok(OutputOption::Rich),
            _ => Err(format!("Invalid output option: {}", s)),
        }
    }
}
