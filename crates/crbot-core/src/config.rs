//! Loading of the roster, run configuration, and secrets files.
//!
//! All three accept YAML (`.yaml`, `.yml`) or JSON (`.json`); the format is
//! chosen by file extension. Errors here are fatal: the binary stops before
//! any pull request is processed.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::notify::NotificationPolicy;
use crate::roster::ClaSigners;

/// Environment variable consulted when no secrets file is given.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Optional run configuration; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_as_external: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationPolicy>,
}

/// Credentials for the hosting service.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub auth: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets").field("auth", &"<redacted>").finish()
    }
}

impl Secrets {
    /// Token from [`TOKEN_ENV_VAR`], if set and non-empty.
    pub fn from_env() -> Option<Self> {
        std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|token| !token.is_empty())
            .map(|auth| Secrets { auth })
    }
}

enum Format {
    Yaml,
    Json,
}

fn detect_format(kind: &'static str, path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(ConfigError::UnsupportedFormat {
            kind,
            path: path.to_path_buf(),
        }),
    }
}

/// Parse `contents` in the format implied by `path`.
///
/// Blank input yields `T::default()`.
pub fn parse_str<T>(kind: &'static str, path: &Path, contents: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    let format = detect_format(kind, path)?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    let parsed = match format {
        Format::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
    };
    parsed.map_err(|detail| ConfigError::Parse {
        kind,
        path: path.to_path_buf(),
        detail,
    })
}

fn load_file<T>(kind: &'static str, path: &Path) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    detect_format(kind, path)?;
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        kind,
        path: path.to_path_buf(),
        source,
    })?;
    debug!(kind, path = %path.display(), bytes = contents.len(), "loaded file");
    parse_str(kind, path, &contents)
}

/// Load the CLA signer roster.
pub fn load_cla_signers(path: &Path) -> Result<ClaSigners, ConfigError> {
    load_file("CLA signers", path)
}

/// Load the optional run configuration.
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    load_file("config", path)
}

/// Load the secrets file; an empty `auth` is an error.
pub fn load_secrets(path: &Path) -> Result<Secrets, ConfigError> {
    let secrets: Secrets = load_file("secrets", path)?;
    if secrets.auth.is_empty() {
        return Err(ConfigError::Missing(format!(
            "`auth` in secrets file {}",
            path.display()
        )));
    }
    Ok(secrets)
}

/// Parse a comma-separated list of pull-request numbers.
///
/// Elements must fit in 32 bits. An empty string yields an empty list; any
/// other invalid element fails the whole list.
pub fn parse_pull_numbers(list: &str) -> Result<Vec<u64>, ConfigError> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }
    list.split(',')
        .map(|element| {
            element
                .trim()
                .parse::<u32>()
                .map(u64::from)
                .map_err(|_| ConfigError::Invalid {
                    field: "pr".to_string(),
                    value: list.to_string(),
                })
        })
        .collect()
}
