//! Tool settings: where the blueprint source lives and how to fetch it.
pub mod format;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use format::Format;

/// Top-level settings file.
///
/// ```toml
/// [repository.blueprints]
/// localPath = "~/.local/share/rwr/blueprints"
/// remoteStoreType = "git"
/// remoteStoreURL = "https://github.com/me/blueprints.git"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `[repository]` table.
    pub repository: RepositorySettings,
}

/// `[repository]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    /// `[repository.blueprints]` table.
    pub blueprints: BlueprintSettings,
}

/// `[repository.blueprints]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlueprintSettings {
    /// Local checkout or plain directory holding the blueprints.
    pub local_path: Option<String>,
    /// `"git"` to sync from a remote store; anything else means local only.
    pub remote_store_type: Option<String>,
    /// Remote store URL, required when the store type is `git`.
    #[serde(rename = "remoteStoreURL", alias = "remoteStoreUrl")]
    pub remote_store_url: Option<String>,
}

impl Settings {
    /// Load settings from `path`, inferring the format from its extension.
    ///
    /// A missing file yields default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Format::from_path(path)
            .and_then(|format| format.decode(&data, &path.display().to_string()))
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Default settings path: `$XDG_CONFIG_HOME/rwr/config.toml`, falling back
/// to `~/.config/rwr/config.toml`.
#[must_use]
pub fn default_settings_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map_or_else(|_| home_dir().join(".config"), PathBuf::from)
        .join("rwr")
        .join("config.toml")
}

/// Expand a leading `~/` against the user's home directory.
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return home_dir();
    }
    path.strip_prefix("~/")
        .map_or_else(|| PathBuf::from(path), |rest| home_dir().join(rest))
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_or_else(|_| PathBuf::from("."), PathBuf::from)
}
