//! Package install/remove resource.
use std::fmt;

use super::manager::{ManagerRegistry, ManagerTemplate};
use super::{Applicable, ResourceChange};
use crate::blueprints::packages::PackageUnit;
use crate::error::PackageError;
use crate::exec::{Command, Executor, run_command};

/// What to do with a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Use the manager's install template.
    Install,
    /// Use the manager's remove template.
    Remove,
}

impl Action {
    /// Parse a blueprint action value (exact match).
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::UnsupportedAction`] for anything but
    /// `install` and `remove`.
    pub fn parse(package: &str, action: &str) -> Result<Self, PackageError> {
        match action {
            "install" => Ok(Self::Install),
            "remove" => Ok(Self::Remove),
            other => Err(PackageError::UnsupportedAction {
                package: package.to_string(),
                action: other.to_string(),
            }),
        }
    }

    /// The template this action selects.
    #[must_use]
    pub fn template(self, manager: &ManagerTemplate) -> &str {
        match self {
            Self::Install => &manager.install,
            Self::Remove => &manager.remove,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => write!(f, "install"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// A package unit resolved to a concrete command.
pub struct PackageResource<'a> {
    /// Package name.
    pub name: String,
    /// Manager the command belongs to.
    pub manager: String,
    /// Requested action.
    pub action: Action,
    command: Command,
    executor: &'a dyn Executor,
    debug: bool,
}

impl fmt::Debug for PackageResource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageResource")
            .field("name", &self.name)
            .field("manager", &self.manager)
            .field("action", &self.action)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl<'a> PackageResource<'a> {
    /// Resolve `unit` against `registry`.
    ///
    /// The command runs elevated when either the manager or the unit asks
    /// for it; a unit can raise privilege but never lower it.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit has no name, names an unknown manager,
    /// or requests an unknown action.
    pub fn resolve(
        unit: &PackageUnit,
        registry: &ManagerRegistry,
        executor: &'a dyn Executor,
        debug: bool,
    ) -> Result<Self, PackageError> {
        if unit.name.is_empty() {
            return Err(PackageError::MissingName);
        }
        let manager = registry.resolve(&unit.package_manager)?;
        let action = Action::parse(&unit.name, &unit.action)?;
        Ok(Self {
            name: unit.name.clone(),
            manager: manager.name.clone(),
            action,
            command: Command {
                exec: action.template(manager).to_string(),
                args: vec![unit.name.clone()],
                elevated: manager.elevated || unit.elevated,
            },
            executor,
            debug,
        })
    }

    /// The command [`apply`](Applicable::apply) runs.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.command
    }
}

impl Applicable for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} {} ({})", self.action, self.name, self.manager)
    }

    fn apply(&self) -> Result<ResourceChange, PackageError> {
        run_command(self.executor, &self.command, self.debug).map_err(|e| {
            PackageError::Execution {
                package: self.name.clone(),
                source: e.into(),
            }
        })?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::exec::{ExecResult, MockExecutor};
    use crate::resources::manager::ManagerId;

    fn unit(name: &str, manager: &str, action: &str, elevated: bool) -> PackageUnit {
        PackageUnit {
            name: name.to_string(),
            package_manager: manager.to_string(),
            action: action.to_string(),
            elevated,
        }
    }

    fn registry() -> ManagerRegistry {
        ManagerRegistry::new(ManagerId::Apt.template())
    }

    #[test]
    fn resolve_builds_install_command() {
        let executor = MockExecutor::new();
        let resource = PackageResource::resolve(
            &unit("git", "apt", "install", false),
            &registry(),
            &executor,
            false,
        )
        .unwrap();
        assert_eq!(resource.command().to_string(), "sudo apt-get install -y git");
        assert_eq!(resource.description(), "install git (apt)");
    }

    #[test]
    fn resolve_builds_remove_command() {
        let executor = MockExecutor::new();
        let resource = PackageResource::resolve(
            &unit("ripgrep", "cargo", "remove", false),
            &registry(),
            &executor,
            false,
        )
        .unwrap();
        assert_eq!(resource.command().to_string(), "cargo uninstall ripgrep");
    }

    #[test]
    fn unit_elevation_only_raises_privilege() {
        let executor = MockExecutor::new();
        let registry = registry();
        let raised = PackageResource::resolve(
            &unit("x", "cargo", "install", true),
            &registry,
            &executor,
            false,
        )
        .unwrap();
        assert!(raised.command().elevated);
        let kept = PackageResource::resolve(
            &unit("x", "apt", "install", false),
            &registry,
            &executor,
            false,
        )
        .unwrap();
        assert!(kept.command().elevated);
    }

    #[test]
    fn resolve_rejects_unknown_action() {
        let executor = MockExecutor::new();
        let err = PackageResource::resolve(
            &unit("git", "", "upgrade", false),
            &registry(),
            &executor,
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PackageError::UnsupportedAction { ref action, .. } if action == "upgrade"
        ));
    }

    #[test]
    fn resolve_rejects_action_case_mismatch() {
        assert!(Action::parse("git", "Install").is_err());
    }

    #[test]
    fn resolve_rejects_unknown_manager_before_action() {
        let executor = MockExecutor::new();
        let err = PackageResource::resolve(
            &unit("git", "unknown-xyz", "upgrade", false),
            &registry(),
            &executor,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, PackageError::UnsupportedManager(_)));
    }

    #[test]
    fn resolve_rejects_missing_name() {
        let executor = MockExecutor::new();
        let err = PackageResource::resolve(
            &unit("", "apt", "install", false),
            &registry(),
            &executor,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, PackageError::MissingName));
    }

    #[test]
    fn apply_runs_command_through_executor() {
        let mut executor = MockExecutor::new();
        executor
            .expect_run()
            .withf(|program, args| program == "brew" && args == ["install", "jq"])
            .times(1)
            .returning(|_, _| Ok(ExecResult::ok("")));
        let registry = ManagerRegistry::new(ManagerId::Brew.template());
        let resource = PackageResource::resolve(
            &unit("jq", "", "install", false),
            &registry,
            &executor,
            false,
        )
        .unwrap();
        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
    }

    #[test]
    fn apply_failure_is_execution_error() {
        let mut executor = MockExecutor::new();
        executor
            .expect_run()
            .returning(|_, _| Err(anyhow::anyhow!("exit status 100")));
        let resource = PackageResource::resolve(
            &unit("git", "apt", "install", false),
            &registry(),
            &executor,
            false,
        )
        .unwrap();
        let err = resource.apply().unwrap_err();
        assert_eq!(
            err.to_string(),
            "error processing package git: exit status 100"
        );
    }
}
