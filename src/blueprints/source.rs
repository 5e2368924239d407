//! Locating (and optionally refreshing) the blueprint source tree.
use std::path::{Path, PathBuf};

use super::git::{GitTransport, PullOutcome};
use crate::config::{BlueprintSettings, expand_home};
use crate::error::{ConfigError, SourceError};
use crate::logging::Log;

/// Init descriptor candidates, in probe order.
pub const INIT_FILES: [&str; 3] = ["init.yaml", "init.json", "init.toml"];

/// Kind of remote store backing the local path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    /// Local directory only.
    None,
    /// Git repository cloned into and pulled from `remote_url`.
    Git,
}

/// Where the blueprints live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintSource {
    /// Local directory (or checkout).
    pub local_path: PathBuf,
    /// Remote store kind.
    pub remote: RemoteKind,
    /// Remote URL; empty unless `remote` is [`RemoteKind::Git`].
    pub remote_url: String,
}

/// A located blueprint tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintLocation {
    /// Root directory of the tree.
    pub root: PathBuf,
    /// Init descriptor that was found.
    pub init_file: PathBuf,
}

impl BlueprintSource {
    /// Build the source from settings. `local_override` replaces `localPath`.
    ///
    /// # Errors
    ///
    /// Returns an error if no local path is configured, or if the store type
    /// is `git` without a URL.
    pub fn from_settings(
        settings: &BlueprintSettings,
        local_override: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let local_path = match (local_override, settings.local_path.as_deref()) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) if !path.trim().is_empty() => expand_home(path.trim()),
            _ => return Err(ConfigError::MissingKey("repository.blueprints.localPath")),
        };

        let remote = match settings.remote_store_type.as_deref() {
            Some("git") => RemoteKind::Git,
            _ => RemoteKind::None,
        };
        let remote_url = settings.remote_store_url.clone().unwrap_or_default();
        if remote == RemoteKind::Git && remote_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "repository.blueprints.remoteStoreURL",
                message: "a URL is required when remoteStoreType is git".to_string(),
            });
        }

        Ok(Self {
            local_path,
            remote,
            remote_url: if remote == RemoteKind::Git {
                remote_url
            } else {
                String::new()
            },
        })
    }
}

/// Ensure the blueprint tree is present and find its init descriptor.
///
/// A git source is cloned when the local path is missing and, with `update`,
/// pulled when it exists. Local sources are used as they are.
///
/// # Errors
///
/// Returns an error if the clone or pull fails, or if no init descriptor
/// exists at the root.
pub fn locate(
    source: &BlueprintSource,
    update: bool,
    transport: &dyn GitTransport,
    log: &dyn Log,
) -> Result<BlueprintLocation, SourceError> {
    let root = &source.local_path;

    if source.remote == RemoteKind::Git {
        if root.exists() {
            if update {
                log.info(&format!("pulling blueprints in {}", root.display()));
                match transport.pull(root) {
                    Ok(PullOutcome::AlreadyUpToDate) => log.info("already up to date"),
                    Ok(PullOutcome::Updated) => log.info("blueprints updated"),
                    Err(source) => {
                        return Err(SourceError::Sync {
                            path: root.clone(),
                            source,
                        });
                    }
                }
            }
        } else {
            log.info(&format!(
                "cloning {} into {}",
                source.remote_url,
                root.display()
            ));
            transport
                .clone_repo(&source.remote_url, root)
                .map_err(|e| SourceError::Fetch {
                    url: source.remote_url.clone(),
                    path: root.clone(),
                    source: e,
                })?;
        }
    }

    let init_file = find_init_file(root).ok_or_else(|| SourceError::MissingInit {
        path: root.clone(),
    })?;
    log.debug(&format!("using init descriptor {}", init_file.display()));
    Ok(BlueprintLocation {
        root: root.clone(),
        init_file,
    })
}

/// First of [`INIT_FILES`] that exists under `root`.
#[must_use]
pub fn find_init_file(root: &Path) -> Option<PathBuf> {
    INIT_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::blueprints::git::MockGitTransport;
    use crate::logging::Logger;

    fn settings(local: Option<&str>, kind: Option<&str>, url: Option<&str>) -> BlueprintSettings {
        BlueprintSettings {
            local_path: local.map(String::from),
            remote_store_type: kind.map(String::from),
            remote_store_url: url.map(String::from),
        }
    }

    fn local_source(root: &Path) -> BlueprintSource {
        BlueprintSource {
            local_path: root.to_path_buf(),
            remote: RemoteKind::None,
            remote_url: String::new(),
        }
    }

    fn git_source(root: &Path) -> BlueprintSource {
        BlueprintSource {
            local_path: root.to_path_buf(),
            remote: RemoteKind::Git,
            remote_url: "https://example.invalid/bp.git".to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // from_settings
    // -----------------------------------------------------------------------

    #[test]
    fn from_settings_git_requires_exact_type() {
        let s = BlueprintSource::from_settings(
            &settings(Some("/bp"), Some("git"), Some("https://x/bp.git")),
            None,
        )
        .unwrap();
        assert_eq!(s.remote, RemoteKind::Git);

        let s = BlueprintSource::from_settings(
            &settings(Some("/bp"), Some("Git"), Some("https://x/bp.git")),
            None,
        )
        .unwrap();
        assert_eq!(s.remote, RemoteKind::None);
        assert!(s.remote_url.is_empty());
    }

    #[test]
    fn from_settings_requires_local_path() {
        let err = BlueprintSource::from_settings(&settings(None, None, None), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(_)));
        let err =
            BlueprintSource::from_settings(&settings(Some("  "), None, None), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(_)));
    }

    #[test]
    fn from_settings_git_requires_url() {
        let err = BlueprintSource::from_settings(&settings(Some("/bp"), Some("git"), None), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn from_settings_override_wins() {
        let s = BlueprintSource::from_settings(
            &settings(Some("/bp"), None, None),
            Some(Path::new("/other")),
        )
        .unwrap();
        assert_eq!(s.local_path, PathBuf::from("/other"));
        let s = BlueprintSource::from_settings(&settings(None, None, None), Some(Path::new("/x")))
            .unwrap();
        assert_eq!(s.local_path, PathBuf::from("/x"));
    }

    // -----------------------------------------------------------------------
    // find_init_file
    // -----------------------------------------------------------------------

    #[test]
    fn init_probe_prefers_yaml_then_json_then_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("init.toml"), "").unwrap();
        assert_eq!(find_init_file(dir.path()), Some(dir.path().join("init.toml")));
        std::fs::write(dir.path().join("init.json"), "{}").unwrap();
        assert_eq!(find_init_file(dir.path()), Some(dir.path().join("init.json")));
        std::fs::write(dir.path().join("init.yaml"), "").unwrap();
        assert_eq!(find_init_file(dir.path()), Some(dir.path().join("init.yaml")));
    }

    #[test]
    fn init_probe_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("init.yaml")).unwrap();
        assert!(find_init_file(dir.path()).is_none());
    }

    // -----------------------------------------------------------------------
    // locate
    // -----------------------------------------------------------------------

    #[test]
    fn locate_local_source_never_touches_git() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("init.json"), "{}").unwrap();
        let transport = MockGitTransport::new();
        let loc =
            locate(&local_source(dir.path()), true, &transport, &Logger::new("test")).unwrap();
        assert_eq!(loc.root, dir.path());
        assert_eq!(loc.init_file, dir.path().join("init.json"));
    }

    #[test]
    fn locate_missing_init_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockGitTransport::new();
        let err =
            locate(&local_source(dir.path()), false, &transport, &Logger::new("test")).unwrap_err();
        assert!(matches!(err, SourceError::MissingInit { .. }));
    }

    #[test]
    fn locate_clones_when_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("bp");
        let mut transport = MockGitTransport::new();
        transport
            .expect_clone_repo()
            .withf(|url, _| url == "https://example.invalid/bp.git")
            .times(1)
            .returning(|_, path| {
                std::fs::create_dir_all(path).unwrap();
                std::fs::write(path.join("init.yaml"), "").unwrap();
                Ok(())
            });
        transport.expect_pull().never();
        let loc = locate(&git_source(&root), true, &transport, &Logger::new("test")).unwrap();
        assert_eq!(loc.init_file, root.join("init.yaml"));
    }

    #[test]
    fn locate_clone_failure_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut transport = MockGitTransport::new();
        transport
            .expect_clone_repo()
            .returning(|_, _| Err(git2::Error::from_str("unreachable")));
        let err = locate(
            &git_source(&dir.path().join("bp")),
            false,
            &transport,
            &Logger::new("test"),
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Fetch { .. }));
        assert!(err.to_string().starts_with("error cloning Git repository"));
    }

    #[test]
    fn locate_pulls_only_with_update() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("init.yaml"), "").unwrap();

        let mut transport = MockGitTransport::new();
        transport.expect_pull().never();
        locate(&git_source(dir.path()), false, &transport, &Logger::new("test")).unwrap();

        let mut transport = MockGitTransport::new();
        transport
            .expect_pull()
            .times(1)
            .returning(|_| Ok(PullOutcome::AlreadyUpToDate));
        locate(&git_source(dir.path()), true, &transport, &Logger::new("test")).unwrap();
    }

    #[test]
    fn locate_pull_failure_is_sync_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("init.yaml"), "").unwrap();
        let mut transport = MockGitTransport::new();
        transport
            .expect_pull()
            .returning(|_| Err(git2::Error::from_str("non-fast-forward update")));
        let err =
            locate(&git_source(dir.path()), true, &transport, &Logger::new("test")).unwrap_err();
        assert!(matches!(err, SourceError::Sync { .. }));
    }
}
