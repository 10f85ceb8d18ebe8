//! User profile service

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::bookmarks::BookmarkService;
use super::store::{StoreError, TomlStore};
use crate::types::{LanguageCount, UserId, UserProfile, UserProfileUpdate, UserProfileWithStats};

const USERS_FILE: &str = "users.toml";

/// Public bookmarks shown on a profile
const RECENT_BOOKMARKS_LIMIT: usize = 5;

/// Languages listed on a profile
const TOP_LANGUAGES_LIMIT: usize = 3;

/// User service errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserServiceError {
    NotFound(String),
    AlreadyExists(String),
    Store(StoreError),
}

impl std::fmt::Display for UserServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "User '{}' not found", id),
            Self::AlreadyExists(id) => write!(f, "User '{}' already has a profile", id),
            Self::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for UserServiceError {}

impl From<StoreError> for UserServiceError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserDocument {
    #[serde(default)]
    users: Vec<UserProfile>,
}

#[derive(Debug, Clone)]
pub struct UserService {
    users: Vec<UserProfile>,
    store: TomlStore,
}

impl UserService {
    pub fn new(data_dir: &Path) -> Result<Self, UserServiceError> {
        let store = TomlStore::open(data_dir, USERS_FILE)?;
        let document: UserDocument = store.load()?;

        Ok(Self {
            users: document.users,
            store,
        })
    }

    /// Saves `users` and makes them current only once the write succeeded
    fn commit(&mut self, users: Vec<UserProfile>) -> Result<(), UserServiceError> {
        let document = UserDocument { users };
        self.store.save(&document)?;
        self.users = document.users;
        Ok(())
    }

    pub fn create_profile(
        &mut self,
        user_id: UserId,
        display_name: String,
        photo_url: Option<String>,
    ) -> Result<UserProfile, UserServiceError> {
        if self.users.iter().any(|u| u.id == user_id) {
            return Err(UserServiceError::AlreadyExists(user_id.to_string()));
        }

        let profile = UserProfile::new(user_id, display_name, photo_url);
        let mut users = self.users.clone();
        users.push(profile.clone());
        self.commit(users)?;

        info!("Created profile for user {}", profile.id);
        Ok(profile)
    }

    pub fn get_profile(&self, user_id: &UserId) -> Option<&UserProfile> {
        self.users.iter().find(|u| &u.id == user_id)
    }

    pub fn update_profile(
        &mut self,
        user_id: &UserId,
        update: UserProfileUpdate,
    ) -> Result<UserProfile, UserServiceError> {
        let index = self
            .users
            .iter()
            .position(|u| &u.id == user_id)
            .ok_or_else(|| UserServiceError::NotFound(user_id.to_string()))?;

        let mut users = self.users.clone();
        let profile = &mut users[index];

        if let Some(display_name) = update.display_name {
            profile.display_name = display_name;
        }
        if let Some(photo_url) = update.photo_url {
            profile.photo_url = Some(photo_url);
        }
        if let Some(bio) = update.bio {
            profile.bio = Some(bio);
        }
        if let Some(interests) = update.interests {
            profile.interests = interests;
        }

        let updated = profile.clone();
        self.commit(users)?;
        Ok(updated)
    }

    /// Profile with its public bookmark count, latest public bookmarks and
    /// the most frequent languages among them
    pub fn profile_with_stats(
        &self,
        user_id: &UserId,
        bookmarks: &BookmarkService,
    ) -> Result<UserProfileWithStats, UserServiceError> {
        let profile = self
            .get_profile(user_id)
            .cloned()
            .ok_or_else(|| UserServiceError::NotFound(user_id.to_string()))?;

        let recent_bookmarks = bookmarks
            .user_feed(user_id, RECENT_BOOKMARKS_LIMIT, None)
            .activities;

        let mut counts: AHashMap<&str, usize> = AHashMap::new();
        for bookmark in &recent_bookmarks {
            *counts.entry(bookmark.repo.language.as_str()).or_default() += 1;
        }

        let mut top_languages: Vec<LanguageCount> = counts
            .into_iter()
            .map(|(language, count)| LanguageCount {
                language: language.to_string(),
                count,
            })
            .collect();
        top_languages.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.language.cmp(&b.language)));
        top_languages.truncate(TOP_LANGUAGES_LIMIT);

        Ok(UserProfileWithStats {
            total_bookmarks: bookmarks.public_bookmark_count(user_id),
            profile,
            recent_bookmarks,
            top_languages,
        })
    }
}
