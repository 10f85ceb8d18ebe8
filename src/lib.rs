/// Repository exclusion rules and the keyword classifier
pub mod classifier;

/// Output formatting utilities for JSON and Markdown representations
pub mod formatter;

/// GitHub API client, error classification and response validation
pub mod github;

/// Catalog paging, languages, bookmarks and user profile services
pub mod services;

/// MCP tool implementations exposing library functionality through the protocol
pub mod tools;

/// Transport layer implementations for MCP server modes (stdio, SSE)
pub mod transport;

/// Core type definitions and domain models used throughout the library
pub mod types;
