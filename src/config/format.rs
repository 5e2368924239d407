//! Structured-data formats shared by settings, init descriptors and blueprints.
use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::BlueprintError;

/// A structured-data encoding we can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML (`.yaml`, `.yml`).
    Yaml,
    /// JSON (`.json`).
    Json,
    /// TOML (`.toml`).
    Toml,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
            Self::Toml => write!(f, "toml"),
        }
    }
}

impl Format {
    /// Resolve a format from a file extension (with or without the leading
    /// dot) or from a configured format name.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::UnsupportedFormat`] for anything else.
    pub fn from_hint(hint: &str) -> Result<Self, BlueprintError> {
        match hint.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(BlueprintError::UnsupportedFormat(hint.to_string())),
        }
    }

    /// Resolve a format from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::UnsupportedFormat`] if the path has no
    /// extension or an unknown one.
    pub fn from_path(path: &Path) -> Result<Self, BlueprintError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| BlueprintError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_hint(ext)
    }

    /// Decode `data` into `T`.
    ///
    /// `origin` labels the buffer in error messages (usually a file path).
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::Decode`] if the bytes are not valid for this
    /// format or do not match the shape of `T`.
    pub fn decode<T: DeserializeOwned>(
        self,
        data: &[u8],
        origin: &str,
    ) -> Result<T, BlueprintError> {
        let decoded = match self {
            Self::Yaml => serde_yaml::from_slice(data).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_slice(data).map_err(|e| e.to_string()),
            Self::Toml => std::str::from_utf8(data)
                .map_err(|e| e.to_string())
                .and_then(|text| toml::from_str(text).map_err(|e| e.to_string())),
        };
        decoded.map_err(|message| BlueprintError::Decode {
            origin: origin.to_string(),
            format: self,
            message,
        })
    }
}
