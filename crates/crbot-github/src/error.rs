//! Error types for crbot-github

use crbot_core::HostError;
use thiserror::Error;

/// Errors talking to the GitHub REST API
#[derive(Error, Debug)]
pub enum GitHubError {
    /// The request could not be sent or the response not read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-success status
    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The configured API URL cannot be used as a base
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    /// Response body did not match the expected shape
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GitHubError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::Api { status: 404, .. })
    }
}

impl From<GitHubError> for HostError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Api {
                status: 404,
                message,
            } => HostError::NotFound { resource: message },
            GitHubError::Api { status, message } => HostError::Api { status, message },
            GitHubError::Http(e) => HostError::Transport(e.to_string()),
            GitHubError::InvalidUrl(url) => HostError::Transport(format!("invalid API URL: {url}")),
            GitHubError::Json(e) => HostError::Decode(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_host_not_found() {
        let err = GitHubError::Api {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert!(err.is_not_found());
        assert!(HostError::from(err).is_not_found());
    }

    #[test]
    fn test_other_statuses_keep_status() {
        let host = HostError::from(GitHubError::Api {
            status: 403,
            message: "rate limited".to_string(),
        });
        assert_eq!(
            host,
            HostError::Api {
                status: 403,
                message: "rate limited".to_string()
            }
        );
    }

    #[test]
    fn test_json_maps_to_decode() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(
            HostError::from(GitHubError::from(json_err)),
            HostError::Decode(_)
        ));
    }
}
