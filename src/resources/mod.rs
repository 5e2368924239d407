//! Package resources and the manager registry they resolve against.
pub mod manager;
pub mod package;

use crate::error::PackageError;

/// Interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// # Errors
    ///
    /// Returns an error scoped to this resource if the change cannot be
    /// applied. Callers record it and move on.
    fn apply(&self) -> Result<ResourceChange, PackageError>;
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use rwr_cli::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let skipped = ResourceChange::Skipped { reason: "dry run".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, skipped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// The command ran successfully.
    Applied,
    /// Nothing was executed.
    Skipped {
        /// Why nothing was executed.
        reason: String,
    },
}
