// Shared helpers for integration tests.
//
// Provides a temporary blueprint tree with a fluent builder, a local git
// origin for source-locator tests, and an executor that records commands
// instead of running them.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rwr_cli::cli::GlobalOpts;
use rwr_cli::commands::CommandSetup;
use rwr_cli::exec::{ExecResult, Executor};
use rwr_cli::logging::Logger;
use rwr_cli::platform::{Os, Platform};

/// Minimal init descriptor: default order, YAML for pre-resolved buffers.
pub const MINIMAL_INIT: &str = "blueprints:\n  format: yaml\n";

/// An isolated blueprint tree backed by a [`tempfile::TempDir`].
pub struct BlueprintTree {
    /// Temporary directory holding the tree.
    pub root: tempfile::TempDir,
}

impl BlueprintTree {
    /// Create a tree containing only [`MINIMAL_INIT`] as `init.yaml`.
    pub fn new() -> Self {
        Self::with_init("init.yaml", MINIMAL_INIT)
    }

    /// Create a tree whose init descriptor is `name` with `content`.
    pub fn with_init(name: &str, content: &str) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::write(root.path().join(name), content).expect("write init descriptor");
        Self { root }
    }

    /// Path to the tree root.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn file(self, rel: &str, content: &str) -> Self {
        write_file(self.path(), rel, content);
        self
    }

    /// Global options pointing at this tree with no settings file.
    pub fn global_opts(&self) -> GlobalOpts {
        GlobalOpts {
            config: Some(self.path().join("no-settings.toml")),
            blueprints: Some(self.path().to_path_buf()),
            ..GlobalOpts::default()
        }
    }
}

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// Executor that records every invocation and fails for listed packages.
///
/// Every binary is reported as installed.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<String>>,
    failing: Vec<String>,
}

impl RecordingExecutor {
    /// An executor where commands whose last argument is in `failing` exit
    /// non-zero.
    pub fn failing(failing: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: failing.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Command lines seen so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, program: &str, args: &[String]) -> anyhow::Result<ExecResult> {
        let line = std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("calls lock").push(line);
        if args.last().is_some_and(|pkg| self.failing.contains(pkg)) {
            anyhow::bail!("exit status 1");
        }
        Ok(ExecResult::ok(""))
    }

    fn which(&self, _: &str) -> bool {
        true
    }
}

/// A Debian-family Linux platform, so `apt` is the default manager.
pub fn debian() -> Platform {
    Platform::new(Os::Linux, &["debian"])
}

/// Build a [`CommandSetup`] for `global` against the recording executor.
pub fn setup(
    global: &GlobalOpts,
    executor: Arc<RecordingExecutor>,
    log: &Arc<Logger>,
) -> CommandSetup {
    CommandSetup::with_services(
        global,
        false,
        log.clone(),
        &rwr_cli::blueprints::git::Git2Transport,
        executor,
        &debian(),
    )
    .expect("command setup")
}

/// A logger that does not write a log file.
pub fn logger() -> Arc<Logger> {
    Arc::new(Logger::with_log_file(None))
}

/// A local git repository used as a remote blueprint store.
pub struct GitOrigin {
    /// Temporary directory holding the repository.
    pub dir: tempfile::TempDir,
    repo: git2::Repository,
}

impl GitOrigin {
    /// Initialise an origin whose first commit contains `files`.
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("create origin dir");
        let repo = git2::Repository::init(dir.path()).expect("init origin");
        let origin = Self { dir, repo };
        origin.commit(files, "initial");
        origin
    }

    /// URL (a local path) to clone from.
    pub fn url(&self) -> String {
        self.dir.path().display().to_string()
    }

    /// Commit `files` on top of the current branch.
    pub fn commit(&self, files: &[(&str, &str)], message: &str) {
        for (rel, content) in files {
            write_file(self.dir.path(), rel, content);
        }
        let mut index = self.repo.index().expect("open index");
        index
            .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
            .expect("stage files");
        index.write().expect("write index");
        let tree_id = index.write_tree().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");
        let sig = git2::Signature::now("rwr", "rwr@example.com").expect("signature");
        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit");
    }
}

/// Settings file selecting a git store at `url` cloned into `local`.
pub fn git_settings(dir: &Path, local: &Path, url: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        format!(
            "[repository.blueprints]\nlocalPath = {:?}\nremoteStoreType = \"git\"\nremoteStoreURL = {:?}\n",
            local.display().to_string(),
            url
        ),
    )
    .expect("write settings");
    path
}
