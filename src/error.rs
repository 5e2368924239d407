//! Domain-specific error types for the provisioning engine.
//!
//! Library modules return the typed errors below; command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via `?`.
//!
//! Errors fall into two tiers:
//!
//! ```text
//! fatal (the run cannot establish its inputs)
//! ├── ConfigError     settings file, required keys
//! ├── SourceError     clone, pull, missing init descriptor
//! ├── PlatformError   no usable package manager
//! └── BlueprintError  one blueprint file could not be read or decoded
//!
//! unit-scoped (recorded in a FailureReport, the run continues)
//! └── PackageError    unsupported manager/action, command failure
//! ```
use std::path::PathBuf;

use thiserror::Error;

use crate::config::format::Format;

/// Errors raised while loading and validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required key is absent or empty.
    #[error("missing required setting '{0}'")]
    MissingKey(&'static str),

    /// A key is present but its value cannot be used.
    #[error("invalid value for '{key}': {message}")]
    InvalidValue {
        /// Dotted key path.
        key: &'static str,
        /// What is wrong with the value.
        message: String,
    },

    /// The settings file exists but could not be read.
    #[error("failed to read settings file {}: {source}", path.display())]
    Io {
        /// Settings file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file could not be decoded.
    #[error("failed to parse settings file {}: {source}", path.display())]
    Parse {
        /// Settings file path.
        path: PathBuf,
        /// Decoder error.
        source: BlueprintError,
    },
}

/// Errors raised while establishing the blueprint source tree.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Cloning the remote store failed.
    #[error("error cloning Git repository {url} into {}: {source}", path.display())]
    Fetch {
        /// Remote URL.
        url: String,
        /// Clone destination.
        path: PathBuf,
        /// Transport error.
        source: git2::Error,
    },

    /// Updating an existing checkout failed.
    #[error("error pulling changes into {}: {source}", path.display())]
    Sync {
        /// Local checkout.
        path: PathBuf,
        /// Transport error.
        source: git2::Error,
    },

    /// None of the init descriptor candidates exist at the source root.
    #[error("init file not found in the blueprints location {}", path.display())]
    MissingInit {
        /// Source root that was probed.
        path: PathBuf,
    },
}

/// Errors raised while reading or decoding a single blueprint file.
#[derive(Error, Debug)]
pub enum BlueprintError {
    /// The file could not be read.
    #[error("error reading blueprint file {}: {source}", path.display())]
    Read {
        /// Blueprint path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The bytes are not valid for the declared format or target schema.
    #[error("error decoding {format} blueprint {origin}: {message}")]
    Decode {
        /// File path or other label for the decoded buffer.
        origin: String,
        /// Format the decoder used.
        format: Format,
        /// Decoder message.
        message: String,
    },

    /// The extension or configured format name is not one we can decode.
    #[error("unsupported blueprint format '{0}'")]
    UnsupportedFormat(String),
}

/// Errors scoped to one package unit of work.
#[derive(Error, Debug)]
pub enum PackageError {
    /// The identifier is outside the closed set of supported managers.
    #[error("unsupported package manager: {0}")]
    UnsupportedManager(String),

    /// The action is neither `install` nor `remove`.
    #[error("unsupported action: {action}")]
    UnsupportedAction {
        /// Package the action was declared for.
        package: String,
        /// The offending action value.
        action: String,
    },

    /// The entry declares neither `name` nor `names`.
    #[error("package entry has no name")]
    MissingName,

    /// The package manager command failed.
    #[error("error processing package {package}: {source}")]
    Execution {
        /// Package that failed.
        package: String,
        /// Underlying execution error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Errors raised by OS and tool detection.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Detection ran but could not find what it needed.
    #[error("platform detection failed: {0}")]
    DetectionFailed(String),
}
