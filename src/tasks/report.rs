//! Per-unit failure aggregation.
use std::fmt;

use crate::error::PackageError;
use crate::logging::Log;

/// One failed unit of work.
#[derive(Debug)]
pub struct Failure {
    /// Unit identifier (the package name).
    pub unit: String,
    /// Why it failed.
    pub error: PackageError,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.unit, self.error)
    }
}

/// Ordered list of unit failures accumulated across a run.
///
/// Recording a failure never stops the run; the report is surfaced as
/// warnings once processing is done.
#[derive(Debug, Default)]
pub struct FailureReport {
    failures: Vec<Failure>,
}

impl FailureReport {
    /// An empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a failure.
    pub fn record(&mut self, unit: impl Into<String>, error: PackageError) {
        self.failures.push(Failure {
            unit: unit.into(),
            error,
        });
    }

    /// Append every failure of `other`, keeping its order.
    pub fn extend(&mut self, other: Self) {
        self.failures.extend(other.failures);
    }

    /// Whether nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Failures in the order they were recorded.
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Unit identifiers in the order they were recorded.
    #[must_use]
    pub fn units(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.unit.as_str()).collect()
    }

    /// Log the report as warnings. Does nothing when empty.
    pub fn warn(&self, log: &dyn Log) {
        if self.is_empty() {
            return;
        }
        log.warn("failed to process the following packages:");
        for failure in &self.failures {
            log.warn(&failure.to_string());
        }
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for failure in &self.failures {
            writeln!(f, "{failure}")?;
        }
        Ok(())
    }
}
