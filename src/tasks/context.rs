use std::sync::Arc;

use crate::blueprints::init::InitConfig;
use crate::exec::Executor;
use crate::logging::Log;
use crate::resources::manager::ManagerRegistry;

/// Shared, read-only state for one run.
///
/// Built once after the source is located and passed by reference to every
/// processor.
pub struct Context {
    /// Manager templates and the OS default.
    pub registry: Arc<ManagerRegistry>,
    /// The loaded init descriptor.
    pub init: Arc<InitConfig>,
    /// Logger for output and step recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Echo command lines and output at debug level.
    pub debug: bool,
    /// Log commands instead of running them.
    pub dry_run: bool,
    /// Process the units of one blueprint concurrently using Rayon.
    pub parallel: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("registry", &self.registry)
            .field("init", &"<InitConfig>")
            .field("log", &"<dyn Log>")
            .field("executor", &"<dyn Executor>")
            .field("debug", &self.debug)
            .field("dry_run", &self.dry_run)
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl Context {
    /// Creates a sequential, non-dry-run context.
    #[must_use]
    pub fn new(
        registry: Arc<ManagerRegistry>,
        init: Arc<InitConfig>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            registry,
            init,
            log,
            executor,
            debug: false,
            dry_run: false,
            parallel: false,
        }
    }
}
