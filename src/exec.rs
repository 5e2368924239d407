//! External command execution.
use std::fmt;
use std::process::Output;

use anyhow::{Context as _, Result, bail};

/// Program used to elevate commands that need root.
pub const ELEVATION_PROGRAM: &str = "sudo";

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl ExecResult {
    /// A successful result with the given stdout (handy for test executors).
    #[must_use]
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs.
///
/// The engine only ever talks to the system through this trait so that tests
/// can record or script command outcomes.
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync {
    /// Run `program` with `args`, failing if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[String]) -> Result<ExecResult>;

    /// Whether `program` is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[String]) -> Result<ExecResult> {
        let output = std::process::Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        let result = ExecResult::from(output);
        if !result.success {
            bail!(
                "{program} failed (exit {}): {}",
                result.code.unwrap_or(-1),
                result.stderr.trim()
            );
        }
        Ok(result)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// A fully resolved unit of execution: a command template, the arguments
/// appended to it, and whether it runs elevated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command template, e.g. `apt-get install -y`. Tokenised with shell
    /// quoting rules.
    pub exec: String,
    /// Arguments appended after the template tokens.
    pub args: Vec<String>,
    /// Prefix with [`ELEVATION_PROGRAM`].
    pub elevated: bool,
}

impl Command {
    /// Split into the program to spawn and its arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is empty or has unbalanced quotes.
    pub fn argv(&self) -> Result<(String, Vec<String>)> {
        let tokens = shlex::split(&self.exec)
            .with_context(|| format!("invalid command template: {:?}", self.exec))?;
        let mut tokens = tokens.into_iter();
        let Some(first) = tokens.next() else {
            bail!("empty command template");
        };

        if self.elevated {
            let args = std::iter::once(first)
                .chain(tokens)
                .chain(self.args.iter().cloned())
                .collect();
            return Ok((ELEVATION_PROGRAM.to_string(), args));
        }
        Ok((first, tokens.chain(self.args.iter().cloned()).collect()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elevated {
            write!(f, "{ELEVATION_PROGRAM} ")?;
        }
        write!(f, "{}", self.exec)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Execute a resolved [`Command`] through `executor`.
///
/// With `debug` set, the command line and its captured output are emitted at
/// debug level.
///
/// # Errors
///
/// Returns an error if the template is invalid or the command fails.
pub fn run_command(executor: &dyn Executor, command: &Command, debug: bool) -> Result<ExecResult> {
    let (program, args) = command.argv()?;
    if debug {
        tracing::debug!("running: {command}");
    }
    let result = executor.run(&program, &args)?;
    if debug {
        for line in result.stdout.lines().chain(result.stderr.lines()) {
            tracing::debug!("  {line}");
        }
    }
    Ok(result)
}
