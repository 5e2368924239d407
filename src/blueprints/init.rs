//! Init descriptor schema and loading.
//!
//! The init descriptor sits at the root of a blueprint source and declares
//! run order plus optional inline records for every category.
use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::order::FileOrderSpec;
use super::packages::PackageEntry;
use crate::config::format::Format;
use crate::error::BlueprintError;

/// Root of the init descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InitConfig {
    /// Run-order and layout settings.
    #[serde(alias = "blueprint")]
    pub blueprints: Init,
    /// Package-manager template overrides.
    pub package_managers: Vec<PackageManagerInfo>,
    /// Package repositories to configure.
    pub repositories: Vec<Repository>,
    /// Inline package entries, processed before the package blueprint files.
    pub packages: Vec<PackageEntry>,
    /// Services to manage.
    pub services: Vec<Service>,
    /// Files to manage.
    pub files: Vec<File>,
    /// Directories to manage.
    pub directories: Vec<Directory>,
    /// Templates to render.
    pub templates: Vec<Template>,
    /// Tool configuration commands.
    pub configuration: Vec<Configuration>,
}

/// The `blueprints` table of the init descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Init {
    /// Format name used for pre-resolved byte buffers (`yaml`, `json`, `toml`).
    pub format: Option<String>,
    /// Subdirectory of the source root that holds the category directories.
    pub location: Option<String>,
    /// Category run order. `None` means the built-in default.
    pub order: Option<Vec<String>>,
    /// Per-category file order.
    pub file_order: BTreeMap<String, FileOrderSpec>,
    /// Only process files named in `fileOrder`; categories without an entry
    /// process no files.
    pub run_only_listed: bool,
}

/// Template override for a package manager.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageManagerInfo {
    /// Manager identifier, or the default manager's name.
    pub name: String,
    /// Replacement install template.
    pub install: Option<String>,
    /// Replacement remove template.
    pub remove: Option<String>,
    /// Replacement elevation flag.
    pub elevated: Option<bool>,
}

/// A package repository declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Repository {
    /// Repository name.
    pub name: String,
    /// Manager the repository belongs to.
    pub package_manager: String,
    /// `add` or `remove`.
    pub action: String,
    /// Repository URL.
    pub url: String,
    /// Signing key URL.
    pub key: String,
    /// Channel or suite.
    pub channel: String,
    /// Component list.
    pub component: String,
}

/// A service declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Service {
    /// Unit name.
    pub name: String,
    /// `enable`, `start`, `stop`, ...
    pub action: String,
    /// Run with elevated privileges.
    pub elevated: bool,
    /// Path the unit file is written to.
    pub target: String,
    /// Inline unit file content.
    pub content: String,
}

/// A managed file declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct File {
    /// Single file name.
    pub name: String,
    /// Several file names sharing the settings below.
    pub names: Vec<String>,
    /// `copy`, `move`, `symlink`, `delete`, ...
    pub action: String,
    /// Source path inside the blueprint tree.
    pub source: String,
    /// Target directory on the machine.
    pub target: String,
    /// Owning user.
    pub owner: String,
    /// Owning group.
    pub group: String,
    /// Octal mode.
    pub mode: u32,
    /// Run with elevated privileges.
    pub elevated: bool,
}

/// A managed directory declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Directory {
    /// Single directory name.
    pub name: String,
    /// Several directory names sharing the settings below.
    pub names: Vec<String>,
    /// `create`, `delete`, ...
    pub action: String,
    /// Parent directory on the machine.
    pub target: String,
    /// Owning user.
    pub owner: String,
    /// Owning group.
    pub group: String,
    /// Octal mode.
    pub mode: u32,
    /// Run with elevated privileges.
    pub elevated: bool,
}

/// A template rendering declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Template {
    /// Template name.
    pub name: String,
    /// Template source inside the blueprint tree.
    pub source: String,
    /// Rendered output path.
    pub target: String,
    /// Octal mode of the rendered file.
    pub mode: u32,
    /// Run with elevated privileges.
    pub elevated: bool,
}

/// A tool configuration declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    /// Tool being configured.
    pub tool: String,
    /// Commands to run, in order.
    pub commands: Vec<String>,
    /// Run with elevated privileges.
    pub elevated: bool,
}

impl InitConfig {
    /// Read and decode the init descriptor at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown extension,
    /// or does not decode into the init schema.
    pub fn load(path: &Path) -> Result<Self, BlueprintError> {
        let format = Format::from_path(path)?;
        let data = std::fs::read(path).map_err(|source| BlueprintError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        format.decode(&data, &path.display().to_string())
    }

    /// Format for pre-resolved byte buffers, from `blueprints.format`.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::UnsupportedFormat`] if no format is
    /// configured or the configured name is unknown.
    pub fn data_format(&self) -> Result<Format, BlueprintError> {
        let hint = self
            .blueprints
            .format
            .as_deref()
            .ok_or_else(|| BlueprintError::UnsupportedFormat(String::new()))?;
        Format::from_hint(hint)
    }
}
