//! Error taxonomy for crbot.

use std::path::PathBuf;

/// Failures reported by a host collaborator (read or write side).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The requested resource does not exist (HTTP 404 on GitHub).
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The host answered with a non-success status.
    #[error("host API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl HostError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, HostError::NotFound { .. })
    }
}

/// Errors loading the roster, run configuration, or secrets.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error reading {kind} file ({path}): {source}")]
    Read {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing {kind} file ({path}): {detail}")]
    Parse {
        kind: &'static str,
        path: PathBuf,
        detail: String,
    },

    #[error("unrecognized file type for {kind} file ({path}); expected .yaml, .yml or .json")]
    UnsupportedFormat { kind: &'static str, path: PathBuf },

    #[error("missing required setting: {0}")]
    Missing(String),

    #[error("invalid value for {field}: {value}")]
    Invalid { field: String, value: String },
}

/// crbot errors.
#[derive(Debug, thiserror::Error)]
pub enum CrbotError {
    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for crbot operations.
pub type Result<T> = std::result::Result<T, CrbotError>;

/// Result type for host collaborator calls.
pub type HostResult<T> = std::result::Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_api_error_display() {
        let err = HostError::Api {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("Bad Gateway"));
    }

    #[test]
    fn test_not_found_is_detected() {
        let err = HostError::NotFound {
            resource: "label cla: yes".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!HostError::Transport("reset".to_string()).is_not_found());
    }

    #[test]
    fn test_crbot_error_wraps_host_error() {
        let err: CrbotError = HostError::Transport("connection refused".to_string()).into();
        assert!(err.to_string().contains("host error"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_unsupported_format_mentions_path() {
        let err = ConfigError::UnsupportedFormat {
            kind: "CLA signers",
            path: PathBuf::from("signers.toml"),
        };
        assert!(err.to_string().contains("signers.toml"));
    }
}
