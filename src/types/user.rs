//! Catalog user identity and profile types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId::new(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId::new(s)
    }
}

/// Display data copied onto bookmarks so feeds can render without a lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub display_name: String,
    pub photo_url: Option<String>,
}

impl UserSummary {
    pub fn new<T: Into<String>>(display_name: T, photo_url: Option<String>) -> Self {
        Self {
            display_name: display_name.into(),
            photo_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: UserId, display_name: String, photo_url: Option<String>) -> Self {
        Self {
            id,
            display_name,
            photo_url,
            bio: None,
            interests: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary::new(self.display_name.clone(), self.photo_url.clone())
    }
}

/// Partial profile update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageCount {
    pub language: String,
    pub count: usize,
}

/// Profile together with its public bookmark activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileWithStats {
    pub profile: UserProfile,
    pub total_bookmarks: usize,
    pub recent_bookmarks: Vec<super::Bookmark>,
    pub top_languages: Vec<LanguageCount>,
}
