//! Core logging types: step entries, status, and the [`Log`] trait.

/// Result of one orchestration step, for summary reporting.
///
/// A step is a blueprint file, an inline init section, or a category that
/// had nothing to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    /// Human-readable step name, e.g. `packages/base.yaml`.
    pub name: String,
    /// Final status of the step.
    pub status: StepStatus,
    /// Optional detail message (failure count, skip reason, error text).
    pub message: Option<String>,
}

/// Status of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Every unit in the step succeeded.
    Ok,
    /// The category has no processor.
    NotApplicable,
    /// The step ran but some units were recorded as failures.
    Partial,
    /// The step ran in dry-run mode; nothing was executed.
    DryRun,
    /// The step could not run at all (unreadable or undecodable file).
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) writes immediately;
/// [`BufferedLog`](super::buffered::BufferedLog) holds messages back so that
/// units running in parallel do not interleave their output.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a step result for the summary.
    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>);
}
