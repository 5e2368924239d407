//! Tracing subscriber setup: console formatter, run log file, initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::{Event, Level, Metadata};

use super::utils::{log_file_path, strip_ansi, timestamp};

/// Target used by [`Logger::stage`](super::Logger::stage).
pub(super) const STAGE_TARGET: &str = "rwr::stage";
/// Target used by [`Logger::dry_run`](super::Logger::dry_run).
pub(super) const DRY_RUN_TARGET: &str = "rwr::dry_run";

/// How an event is rendered, derived from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Stage,
    DryRun,
    Info,
    Debug,
    Warn,
    Error,
}

impl LineKind {
    fn of(metadata: &Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Coloured console line.
    fn console(self, msg: &str) -> String {
        match self {
            Self::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Self::Info => format!("  {msg}"),
            Self::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
            Self::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
            Self::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
        }
    }

    /// Plain, timestamped run-log line.
    fn file(self, time: &str, msg: &str) -> String {
        let tag = match self {
            Self::Stage => return format!("[{time}] ==> {msg}"),
            Self::Info => return format!("[{time}]     {msg}"),
            Self::DryRun => "dry run",
            Self::Debug => "debug",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        format!("[{time}]     [{tag}] {msg}")
    }
}

/// The `message` field of an event.
fn message(event: &Event<'_>) -> String {
    #[derive(Default)]
    struct Message(String);

    impl tracing::field::Visit for Message {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "message" {
                value.clone_into(&mut self.0);
            }
        }

        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    let mut visitor = Message::default();
    event.record(&mut visitor);
    visitor.0
}

/// Layer appending every event to the run log with ANSI codes stripped.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open the run log for `command` under the cache directory.
    ///
    /// Returns `None` if the log cannot be created; the run continues with
    /// console output only.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::open(&log_file_path(command)?)
    }

    /// Start a fresh run log at `path` with a version header.
    pub(super) fn open(path: &Path) -> Option<Self> {
        let version =
            option_env!("RWR_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let rule = "=".repeat(42);
        let header = format!("{rule}\nrwr {version} {}\n{rule}\n", timestamp("%Y-%m-%d %H:%M:%S"));
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let line = LineKind::of(event.metadata())
            .file(&timestamp("%H:%M:%S"), &strip_ansi(&message(event)));
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "{line}").ok();
        }
    }
}

/// Console event format: stage headers, indented messages, coloured levels.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        writeln!(writer, "{}", LineKind::of(event.metadata()).console(&message(event)))
    }
}

/// Install the global [`tracing`] subscriber. Call once at startup.
///
/// The console shows `INFO` and above (`DEBUG` when `verbose`); warnings and
/// errors go to stderr. The run log at `$XDG_CACHE_HOME/rwr/<command>.log`
/// always receives `DEBUG` and above.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .event_format(ConsoleFormatter)
                .with_writer(writer)
                .with_filter(console_level),
        )
        .with(FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG)))
        .init();
}
