pub mod bookmarks;
pub mod catalog;
pub mod languages;
pub mod spotlights;
pub mod store;
pub mod users;

pub use bookmarks::{BookmarkService, BookmarkServiceError};
pub use catalog::{CatalogService, CatalogSettings};
pub use languages::{LanguageCache, LanguageService, LanguageServiceError};
pub use spotlights::SpotlightService;
pub use store::{StoreError, TomlStore, default_data_dir};
pub use users::{UserService, UserServiceError};
