//! Tool function implementations organized by functionality
//!
//! Shared by the MCP tools and the CLI: each function takes parsed input and
//! returns domain values, leaving formatting to the caller.

pub mod bookmarks;
pub mod catalog;
pub mod languages;
