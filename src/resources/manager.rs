//! Package-manager registry: command templates per manager, OS default
//! selection, and identifier resolution.
use std::collections::HashMap;
use std::fmt;

use crate::blueprints::init::PackageManagerInfo;
use crate::error::{PackageError, PlatformError};
use crate::exec::Executor;
use crate::platform::{Os, Platform};

/// AUR helper names. They resolve to the default manager, never to an entry
/// of their own.
pub const AUR_HELPERS: [&str; 6] = ["yay", "paru", "trizen", "yaourt", "pamac", "aura"];

/// Closed set of managers with dedicated templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerId {
    /// Homebrew.
    Brew,
    /// Debian APT.
    Apt,
    /// Fedora/RHEL DNF.
    Dnf,
    /// Solus eopkg.
    Eopkg,
    /// Arch pacman.
    Pacman,
    /// openSUSE zypper.
    Zypper,
    /// Gentoo portage.
    Emerge,
    /// Nix profile installs.
    Nix,
    /// Rust crates.
    Cargo,
}

impl ManagerId {
    /// Every known manager, in detection fallback order.
    pub const ALL: [Self; 9] = [
        Self::Brew,
        Self::Apt,
        Self::Dnf,
        Self::Eopkg,
        Self::Pacman,
        Self::Zypper,
        Self::Emerge,
        Self::Nix,
        Self::Cargo,
    ];

    /// Identifier used in blueprints.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brew => "brew",
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Eopkg => "eopkg",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
            Self::Emerge => "emerge",
            Self::Nix => "nix",
            Self::Cargo => "cargo",
        }
    }

    /// Parse a blueprint identifier (exact, case-sensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == name)
    }

    /// Binary probed on `PATH` to decide whether the manager is installed.
    const fn binary(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Nix => "nix-env",
            other => other.as_str(),
        }
    }

    /// Built-in templates.
    #[must_use]
    pub fn template(self) -> ManagerTemplate {
        let (install, remove, elevated) = match self {
            Self::Brew => ("brew install", "brew uninstall", false),
            Self::Apt => ("apt-get install -y", "apt-get remove -y", true),
            Self::Dnf => ("dnf install -y", "dnf remove -y", true),
            Self::Eopkg => ("eopkg install -y", "eopkg remove -y", true),
            Self::Pacman => (
                "pacman -S --needed --noconfirm",
                "pacman -Rns --noconfirm",
                true,
            ),
            Self::Zypper => ("zypper install -y", "zypper remove -y", true),
            Self::Emerge => ("emerge --ask=n --noreplace", "emerge --ask=n --depclean", true),
            Self::Nix => ("nix-env -i", "nix-env -e", false),
            Self::Cargo => ("cargo install", "cargo uninstall", false),
        };
        ManagerTemplate::new(self.as_str(), install, remove, elevated)
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install/remove command templates for one manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerTemplate {
    /// Manager name, for log output.
    pub name: String,
    /// Install command template; the package name is appended.
    pub install: String,
    /// Remove command template; the package name is appended.
    pub remove: String,
    /// Whether commands need elevation.
    pub elevated: bool,
}

impl ManagerTemplate {
    /// Create a template.
    #[must_use]
    pub fn new(name: &str, install: &str, remove: &str, elevated: bool) -> Self {
        Self {
            name: name.to_string(),
            install: install.to_string(),
            remove: remove.to_string(),
            elevated,
        }
    }

    /// Templates for an AUR helper acting as the default manager.
    #[must_use]
    pub fn aur_helper(helper: &str) -> Self {
        match helper {
            "pamac" => Self::new(
                helper,
                "pamac install --no-confirm",
                "pamac remove --no-confirm",
                false,
            ),
            "aura" => Self::new(helper, "aura -A --noconfirm", "aura -R --noconfirm", true),
            _ => Self::new(
                helper,
                &format!("{helper} -S --needed --noconfirm"),
                &format!("{helper} -Rns --noconfirm"),
                false,
            ),
        }
    }

    fn apply_override(&mut self, info: &PackageManagerInfo) {
        if let Some(install) = &info.install {
            self.install.clone_from(install);
        }
        if let Some(remove) = &info.remove {
            self.remove.clone_from(remove);
        }
        if let Some(elevated) = info.elevated {
            self.elevated = elevated;
        }
    }
}

/// Result of resolving a blueprint identifier, before the table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The OS default manager (empty identifier or an AUR helper).
    Default,
    /// A manager with dedicated templates.
    Manager(ManagerId),
}

impl Lookup {
    /// Map an identifier onto the table.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::UnsupportedManager`] for identifiers outside
    /// the known set and the AUR aliases.
    pub fn resolve(identifier: &str) -> Result<Self, PackageError> {
        if identifier.is_empty() || AUR_HELPERS.contains(&identifier) {
            return Ok(Self::Default);
        }
        ManagerId::from_name(identifier)
            .map(Self::Manager)
            .ok_or_else(|| PackageError::UnsupportedManager(identifier.to_string()))
    }
}

/// Lookup table from manager identifier to templates, plus the OS default.
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ManagerRegistry {
    default: ManagerTemplate,
    managers: HashMap<ManagerId, ManagerTemplate>,
}

impl ManagerRegistry {
    /// Registry with built-in templates and `default` as the OS default.
    #[must_use]
    pub fn new(default: ManagerTemplate) -> Self {
        Self {
            default,
            managers: ManagerId::ALL
                .into_iter()
                .map(|id| (id, id.template()))
                .collect(),
        }
    }

    /// Detect the OS default manager.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::DetectionFailed`] if no known manager is
    /// installed.
    pub fn detect(platform: &Platform, executor: &dyn Executor) -> Result<Self, PlatformError> {
        let default = match Self::family_default(platform, executor) {
            Some(template) => template,
            None => ManagerId::ALL
                .into_iter()
                .find(|id| executor.which(id.binary()))
                .map(ManagerId::template)
                .ok_or_else(|| {
                    PlatformError::DetectionFailed(format!(
                        "no supported package manager found on {platform}"
                    ))
                })?,
        };
        Ok(Self::new(default))
    }

    /// The manager implied by the OS family, if it is installed.
    fn family_default(platform: &Platform, executor: &dyn Executor) -> Option<ManagerTemplate> {
        let pick = |id: ManagerId| executor.which(id.binary()).then(|| id.template());
        match platform.os {
            Os::MacOs => pick(ManagerId::Brew),
            Os::Linux if platform.is_like(&["arch"]) => AUR_HELPERS
                .into_iter()
                .find(|helper| executor.which(helper))
                .map(ManagerTemplate::aur_helper)
                .or_else(|| pick(ManagerId::Pacman)),
            Os::Linux if platform.is_like(&["debian", "ubuntu"]) => pick(ManagerId::Apt),
            Os::Linux if platform.is_like(&["fedora", "rhel", "centos"]) => pick(ManagerId::Dnf),
            Os::Linux if platform.is_like(&["solus"]) => pick(ManagerId::Eopkg),
            Os::Linux if platform.is_like(&["suse", "opensuse"]) => pick(ManagerId::Zypper),
            Os::Linux if platform.is_like(&["gentoo"]) => pick(ManagerId::Emerge),
            Os::Linux if platform.is_like(&["nixos"]) => pick(ManagerId::Nix),
            _ => None,
        }
    }

    /// Templates for a blueprint identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::UnsupportedManager`] for unknown identifiers.
    pub fn resolve(&self, identifier: &str) -> Result<&ManagerTemplate, PackageError> {
        match Lookup::resolve(identifier)? {
            Lookup::Default => Ok(&self.default),
            Lookup::Manager(id) => self
                .managers
                .get(&id)
                .ok_or_else(|| PackageError::UnsupportedManager(identifier.to_string())),
        }
    }

    /// The OS default manager.
    #[must_use]
    pub const fn default_manager(&self) -> &ManagerTemplate {
        &self.default
    }

    /// Apply template overrides from the init descriptor.
    ///
    /// An override named after a known manager updates that manager; one
    /// named after the default manager (or `default`) updates the default.
    /// Returns the names that matched neither.
    pub fn apply_overrides(&mut self, overrides: &[PackageManagerInfo]) -> Vec<String> {
        let mut unknown = Vec::new();
        for info in overrides {
            let mut matched = false;
            if info.name == "default" || info.name == self.default.name {
                self.default.apply_override(info);
                matched = true;
            }
            if let Some(template) = ManagerId::from_name(&info.name)
                .and_then(|id| self.managers.get_mut(&id))
            {
                template.apply_override(info);
                matched = true;
            }
            if !matched {
                unknown.push(info.name.clone());
            }
        }
        unknown
    }
}
