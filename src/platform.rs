use std::fmt;

/// Detected operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Any Linux distribution.
    Linux,
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
    /// Anything else (BSDs and friends).
    Other,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
            Self::Windows => write!(f, "windows"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// Distribution identifiers from `/etc/os-release`: `ID` first, then
    /// every `ID_LIKE` entry. Empty off Linux.
    pub distro_ids: Vec<String>,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        let os = Self::detect_os();
        let distro_ids = if os == Os::Linux {
            std::fs::read_to_string("/etc/os-release")
                .map(|content| parse_os_release(&content))
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        Self { os, distro_ids }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub fn new(os: Os, distro_ids: &[&str]) -> Self {
        Self {
            os,
            distro_ids: distro_ids.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Whether any distribution identifier equals one of `ids`.
    #[must_use]
    pub fn is_like(&self, ids: &[&str]) -> bool {
        self.distro_ids.iter().any(|d| ids.contains(&d.as_str()))
    }

    fn detect_os() -> Os {
        if cfg!(target_os = "linux") {
            Os::Linux
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else if cfg!(target_os = "windows") {
            Os::Windows
        } else {
            Os::Other
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.distro_ids.first() {
            Some(id) => write!(f, "{} ({id})", self.os),
            None => write!(f, "{}", self.os),
        }
    }
}

/// Extract `ID` and `ID_LIKE` values from `os-release` content.
fn parse_os_release(content: &str) -> Vec<String> {
    let mut id = None;
    let mut like = Vec::new();
    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        match key.trim() {
            "ID" => id = Some(value.to_ascii_lowercase()),
            "ID_LIKE" => like = value.split_whitespace().map(str::to_ascii_lowercase).collect(),
            _ => {}
        }
    }
    id.into_iter().chain(like).collect()
}
