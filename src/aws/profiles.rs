//! Local credential-profile store.
//!
//! Reads profile names out of the shared AWS config file. Only the section
//! headers matter here; credential resolution itself is left to the SDK.

use async_trait::async_trait;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("unable to determine home directory")]
    NoHomeDirectory,

    #[error("unable to read AWS config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no AWS profiles found in {path}")]
    Empty { path: PathBuf },
}

/// Source of configured profile names.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fails when the store cannot be read or contains no profiles.
    async fn list_profiles(&self) -> Result<Vec<String>, ProfileStoreError>;
}

/// Profile store backed by an AWS config file (`~/.aws/config` by default).
///
/// The path is resolved up front but the file is only read when profiles
/// are actually listed.
#[derive(Debug, Clone)]
pub struct ConfigFileStore {
    path: Option<PathBuf>,
}

impl ConfigFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Use `$AWS_CONFIG_FILE` if set, otherwise `~/.aws/config`.
    pub fn from_env() -> Self {
        let path = env::var_os("AWS_CONFIG_FILE")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".aws").join("config")));
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[async_trait]
impl ProfileStore for ConfigFileStore {
    async fn list_profiles(&self) -> Result<Vec<String>, ProfileStoreError> {
        let path = self.path().ok_or(ProfileStoreError::NoHomeDirectory)?;
        let contents = fs::read_to_string(path).map_err(|source| ProfileStoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let profiles = parse_profile_names(&contents);
        if profiles.is_empty() {
            return Err(ProfileStoreError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(profiles)
    }
}

fn is_blank_or_comment(text: &str) -> bool {
    let text = text.trim_start();
    text.is_empty() || text.starts_with(';') || text.starts_with('#')
}

/// Extract profile names from config-file contents.
///
/// `[default]` maps to `default`, `[profile name]` maps to `name`. Other
/// sections (`[sso-session ...]`, `[services ...]`) are ignored, and a
/// header may carry a trailing `;` or `#` comment. Names are returned once
/// each, in file order.
pub fn parse_profile_names(contents: &str) -> Vec<String> {
    let mut profiles: Vec<String> = Vec::new();

    for line in contents.lines() {
        let Some((header, trailing)) = line.trim().strip_prefix('[').and_then(|l| l.split_once(']'))
        else {
            continue;
        };
        if !is_blank_or_comment(trailing) {
            continue;
        }
        let header = header.trim();

        let name = if header == "default" {
            Some("default")
        } else {
            header
                .strip_prefix("profile")
                .filter(|rest| rest.starts_with(char::is_whitespace))
                .map(str::trim)
                .filter(|name| !name.is_empty())
        };

        if let Some(name) = name {
            if !profiles.iter().any(|p| p == name) {
                profiles.push(name.to_string());
            }
        }
    }

    profiles
}
