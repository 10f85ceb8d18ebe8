pub mod client;
pub mod error;
pub mod response;

pub use client::{GitHubClient, RepositorySearchExecutor, SEARCH_RESULT_CAP};
pub use error::ApiError;
