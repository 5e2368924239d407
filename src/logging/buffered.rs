//! Buffered logger for parallel unit execution.
use std::sync::{Arc, Mutex};

use super::types::{Log, StepStatus};

/// A single buffered log entry, replayed when flushed.
#[derive(Debug, Clone)]
enum LogEntry {
    Stage(String),
    Info(String),
    Debug(String),
    Warn(String),
    Error(String),
    DryRun(String),
}

impl LogEntry {
    fn replay(&self, log: &dyn Log) {
        match self {
            Self::Stage(msg) => log.stage(msg),
            Self::Info(msg) => log.info(msg),
            Self::Debug(msg) => log.debug(msg),
            Self::Warn(msg) => log.warn(msg),
            Self::Error(msg) => log.error(msg),
            Self::DryRun(msg) => log.dry_run(msg),
        }
    }
}

/// Implement the display methods of [`Log`] by buffering each message into
/// `self.entries` as the corresponding [`LogEntry`] variant.
macro_rules! buffer_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry::$variant(msg.to_string()));
                }
            }
        )+
    };
}

/// Buffered logger for parallel unit execution.
///
/// Captures display output in memory so that units processed concurrently do
/// not interleave their console output. Call [`flush`](Self::flush) in
/// declaration order once the parallel section is done.
///
/// [`record_step`](Log::record_step) goes straight to the backing log.
pub struct BufferedLog {
    inner: Arc<dyn Log>,
    entries: Mutex<Vec<LogEntry>>,
}

impl std::fmt::Debug for BufferedLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedLog")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl BufferedLog {
    /// Create a new buffered logger backed by `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn Log>) -> Self {
        Self {
            inner,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Replay all buffered entries to the backing log and clear the buffer.
    pub fn flush(&self) {
        let entries = match self.entries.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return,
        };
        for entry in &entries {
            entry.replay(self.inner.as_ref());
        }
    }
}

impl Log for BufferedLog {
    buffer_log_methods! {
        stage   => Stage,
        info    => Info,
        debug   => Debug,
        warn    => Warn,
        error   => Error,
        dry_run => DryRun,
    }

    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        self.inner.record_step(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{Logger, isolated_logger};

    #[test]
    fn nothing_reaches_the_file_before_flush() {
        let (log, _tmp, _guard) = isolated_logger();
        let path = log.log_path().cloned().unwrap();
        let buffered = BufferedLog::new(Arc::new(log));
        buffered.info("held-back-marker");
        assert!(!std::fs::read_to_string(&path).unwrap().contains("held-back-marker"));
        buffered.flush();
        assert!(std::fs::read_to_string(&path).unwrap().contains("held-back-marker"));
    }

    #[test]
    fn flush_preserves_order_and_clears() {
        let (log, _tmp, _guard) = isolated_logger();
        let path = log.log_path().cloned().unwrap();
        let buffered = BufferedLog::new(Arc::new(log));
        buffered.dry_run("first");
        buffered.warn("second");
        buffered.flush();
        buffered.flush();
        let contents = std::fs::read_to_string(&path).unwrap();
        let first = contents.find("[dry run] first").unwrap();
        let second = contents.find("[warn] second").unwrap();
        assert!(first < second);
        assert_eq!(contents.matches("second").count(), 1);
    }

    #[test]
    fn record_step_is_forwarded_immediately() {
        let inner = Arc::new(Logger::with_log_file(None));
        let buffered = BufferedLog::new(inner.clone());
        buffered.record_step("packages", StepStatus::Ok, None);
        assert_eq!(inner.step_entries().len(), 1);
    }
}
