use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// User-contributed language offered as a catalog filter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Language {
    pub id: String,
    pub name: String,
    pub added_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Language {
    pub fn new(name: String, added_by: Option<UserId>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            added_by,
            created_at: Utc::now(),
        }
    }

    /// Value used for the search `language:` qualifier
    pub fn filter_value(&self) -> String {
        self.name.to_lowercase()
    }
}
