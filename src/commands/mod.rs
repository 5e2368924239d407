pub mod completions;
pub mod order;
pub mod packages;
pub mod run;
pub mod version;

use std::sync::Arc;

use anyhow::Result;

use crate::blueprints::git::{Git2Transport, GitTransport};
use crate::blueprints::init::InitConfig;
use crate::blueprints::source::{self, BlueprintLocation, BlueprintSource};
use crate::cli::GlobalOpts;
use crate::config::{Settings, default_settings_path};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::platform::Platform;
use crate::resources::manager::ManagerRegistry;
use crate::tasks::Context;

/// A located blueprint tree and its decoded init descriptor.
#[derive(Debug)]
pub struct LoadedBlueprints {
    /// Where the tree lives.
    pub location: BlueprintLocation,
    /// The decoded init descriptor.
    pub init: InitConfig,
}

/// Load settings, locate (and optionally sync) the blueprint source, and
/// decode its init descriptor.
///
/// # Errors
///
/// Returns an error if the settings are invalid, the source cannot be
/// fetched or synced, or the init descriptor is missing or malformed.
pub fn load_blueprints(
    global: &GlobalOpts,
    transport: &dyn GitTransport,
    log: &dyn Log,
) -> Result<LoadedBlueprints> {
    let settings_path = global.config.clone().unwrap_or_else(default_settings_path);
    log.debug(&format!("settings file: {}", settings_path.display()));
    let settings = Settings::load(&settings_path)?;
    let source = BlueprintSource::from_settings(
        &settings.repository.blueprints,
        global.blueprints.as_deref(),
    )?;

    log.stage("Locating blueprints");
    let location = source::locate(&source, global.update, transport, log)?;
    log.info(&format!("blueprints: {}", location.root.display()));

    let init = InitConfig::load(&location.init_file)?;
    log.debug(&format!(
        "{} inline packages, {} manager overrides",
        init.packages.len(),
        init.package_managers.len()
    ));
    Ok(LoadedBlueprints { location, init })
}

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Where the blueprint tree lives.
    pub location: BlueprintLocation,
    /// Run context handed to every processor.
    pub ctx: Context,
}

impl CommandSetup {
    /// Set up against the real system: git2 transport, process executor,
    /// and the detected platform.
    ///
    /// # Errors
    ///
    /// See [`CommandSetup::with_services`].
    pub fn init(global: &GlobalOpts, verbose: bool, log: Arc<dyn Log>) -> Result<Self> {
        Self::with_services(
            global,
            verbose,
            log,
            &Git2Transport,
            Arc::new(SystemExecutor),
            &Platform::detect(),
        )
    }

    /// Load the blueprints, build the package-manager registry, and apply
    /// the init descriptor's manager overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the blueprints cannot be loaded or no usable
    /// package manager is found.
    pub fn with_services(
        global: &GlobalOpts,
        verbose: bool,
        log: Arc<dyn Log>,
        transport: &dyn GitTransport,
        executor: Arc<dyn Executor>,
        platform: &Platform,
    ) -> Result<Self> {
        let LoadedBlueprints { location, init } = load_blueprints(global, transport, log.as_ref())?;

        log.stage("Detecting package manager");
        let mut registry = ManagerRegistry::detect(platform, executor.as_ref())?;
        for name in registry.apply_overrides(&init.package_managers) {
            log.warn(&format!("ignoring override for unknown package manager: {name}"));
        }
        log.info(&format!(
            "platform: {platform}, default package manager: {}",
            registry.default_manager().name
        ));

        let mut ctx = Context::new(Arc::new(registry), Arc::new(init), log, executor);
        ctx.debug = verbose;
        ctx.dry_run = global.dry_run;
        ctx.parallel = global.parallel;
        Ok(Self { location, ctx })
    }
}

/// Print the summary and bail if any step failed.
///
/// # Errors
///
/// Returns an error if one or more steps recorded a failure.
pub fn finish(log: &Logger) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} step(s) failed");
    }
    Ok(())
}
