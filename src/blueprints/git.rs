//! Git transport for remote blueprint stores.
use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{FetchOptions, Repository, Status, StatusOptions};

/// What a pull did to the local checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The checkout already matched the remote branch.
    AlreadyUpToDate,
    /// The checkout was fast-forwarded.
    Updated,
}

/// Clone and update operations on a remote blueprint store.
#[cfg_attr(test, mockall::automock)]
pub trait GitTransport: Send + Sync {
    /// Clone `url` into `path`, which must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone fails for any reason.
    fn clone_repo(&self, url: &str, path: &Path) -> Result<(), git2::Error>;

    /// Fetch the checked-out branch's upstream and fast-forward to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be opened, the fetch fails,
    /// the update is not a fast-forward, or tracked files have local
    /// changes.
    fn pull(&self, path: &Path) -> Result<PullOutcome, git2::Error> {
        let repo = Repository::open(path)?;
        let head = repo.head()?;
        if !head.is_branch() {
            return Err(git2::Error::from_str("HEAD is not a named branch"));
        }
        let refname = head
            .name()
            .ok_or_else(|| git2::Error::from_str("branch name is not valid UTF-8"))?
            .to_string();
        let (remote_name, tracking) = upstream(&repo, &refname);

        let mut remote = repo.find_remote(&remote_name)?;
        remote.fetch::<&str>(&[], Some(&mut FetchOptions::new()), None)?;

        let incoming = repo.reference_to_annotated_commit(&repo.find_reference(&tracking)?)?;
        let (analysis, _) = repo.merge_analysis(&[&incoming])?;

        if analysis.is_up_to_date() {
            return Ok(PullOutcome::AlreadyUpToDate);
        }
        if !analysis.is_fast_forward() {
            return Err(git2::Error::from_str("non-fast-forward update"));
        }
        ensure_clean(&repo)?;

        let target = repo.find_object(incoming.id(), None)?;
        repo.checkout_tree(&target, Some(CheckoutBuilder::default().safe()))?;
        repo.find_reference(&refname)?.set_target(incoming.id(), "rwr: fast-forward")?;
        repo.set_head(&refname)?;
        Ok(PullOutcome::Updated)
    }
}

/// Remote name and remote-tracking ref that `refname` follows.
///
/// Falls back to `origin` and the same-named branch when no upstream is
/// configured.
fn upstream(repo: &Repository, refname: &str) -> (String, String) {
    if let (Ok(remote), Ok(tracking)) = (
        repo.branch_upstream_remote(refname),
        repo.branch_upstream_name(refname),
    ) && let (Some(remote), Some(tracking)) = (remote.as_str(), tracking.as_str())
    {
        return (remote.to_string(), tracking.to_string());
    }
    let branch = refname.strip_prefix("refs/heads/").unwrap_or(refname);
    ("origin".to_string(), format!("refs/remotes/origin/{branch}"))
}

/// Refuse to update a checkout whose tracked files have local changes.
fn ensure_clean(repo: &Repository) -> Result<(), git2::Error> {
    let mut options = StatusOptions::new();
    options.include_untracked(false).include_ignored(false);
    let statuses = repo.statuses(Some(&mut options))?;
    let dirty = statuses.iter().find(|entry| entry.status() != Status::CURRENT);
    match dirty {
        Some(entry) => Err(git2::Error::from_str(&format!(
            "worktree contains unstaged changes: {}",
            entry.path().unwrap_or("<non-UTF-8 path>")
        ))),
        None => Ok(()),
    }
}
