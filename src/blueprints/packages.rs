//! Package blueprint decoding.
//!
//! ```yaml
//! packages:
//!   - name: git
//!     action: install
//!   - names: [ripgrep, fd]
//!     packageManager: cargo
//!     action: install
//! ```
use std::path::Path;

use serde::Deserialize;

use crate::config::format::Format;
use crate::error::BlueprintError;

/// One entry of a package blueprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageEntry {
    /// Single package name; ignored when `names` is non-empty.
    pub name: String,
    /// Several packages sharing the settings below.
    pub names: Vec<String>,
    /// Manager identifier; empty selects the OS default.
    pub package_manager: String,
    /// `install` or `remove`.
    pub action: String,
    /// Force elevation even if the manager does not require it.
    pub elevated: bool,
}

/// One package name with its entry's shared settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUnit {
    /// Package name.
    pub name: String,
    /// Manager identifier; empty selects the OS default.
    pub package_manager: String,
    /// `install` or `remove`.
    pub action: String,
    /// Force elevation.
    pub elevated: bool,
}

impl PackageEntry {
    /// Expand into one unit per package name.
    ///
    /// `names` takes precedence over `name` when non-empty. An entry with
    /// neither yields a single unit with an empty name, which fails on its
    /// own when processed.
    #[must_use]
    pub fn units(&self) -> Vec<PackageUnit> {
        let unit = |name: &str| PackageUnit {
            name: name.to_string(),
            package_manager: self.package_manager.clone(),
            action: self.action.clone(),
            elevated: self.elevated,
        };
        if self.names.is_empty() {
            vec![unit(&self.name)]
        } else {
            self.names.iter().map(|name| unit(name)).collect()
        }
    }
}

/// Top level of a package blueprint file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PackagesData {
    /// Entries in declaration order.
    pub packages: Vec<PackageEntry>,
}

/// Decode package entries from `data`.
///
/// # Errors
///
/// Returns [`BlueprintError::Decode`] if `data` is not a valid package
/// blueprint in `format`.
pub fn decode(data: &[u8], format: Format) -> Result<Vec<PackageEntry>, BlueprintError> {
    decode_labelled(data, format, "<data>")
}

/// Read and decode a package blueprint file, choosing the format by extension.
///
/// # Errors
///
/// Returns an error if the extension is not a known format, or the file
/// cannot be read or decoded.
pub fn read_file(path: &Path) -> Result<Vec<PackageEntry>, BlueprintError> {
    let format = Format::from_path(path)?;
    let data = std::fs::read(path).map_err(|source| BlueprintError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_labelled(&data, format, &path.display().to_string())
}

fn decode_labelled(
    data: &[u8],
    format: Format,
    origin: &str,
) -> Result<Vec<PackageEntry>, BlueprintError> {
    format
        .decode::<PackagesData>(data, origin)
        .map(|blueprint| blueprint.packages)
}
