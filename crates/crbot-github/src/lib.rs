//! GitHub collaborator for crbot
//!
//! [`GitHubClient`] implements [`crbot_core::HostReader`] and
//! [`crbot_core::HostWriter`] over the GitHub REST API.

pub mod client;
pub mod error;

pub use client::{GitHubClient, DEFAULT_API_URL};
pub use error::GitHubError;

/// Result type for GitHub API calls
pub type Result<T> = std::result::Result<T, GitHubError>;
