//! Command: process a single package blueprint.
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{CommandSetup, finish};
use crate::cli::{GlobalOpts, PackagesOpts};
use crate::logging::{Logger, StepStatus};
use crate::tasks::packages::PackagesProcessor;
use crate::tasks::{FailureReport, Processor};

/// Run the `packages` command.
///
/// # Errors
///
/// Returns an error if setup fails, the blueprint cannot be read or decoded,
/// or stdin cannot be read.
pub fn run(
    global: &GlobalOpts,
    opts: &PackagesOpts,
    verbose: bool,
    log: &Arc<Logger>,
) -> Result<()> {
    let setup = CommandSetup::init(global, verbose, log.clone())?;
    run_with(&setup, &opts.file, &mut std::io::stdin().lock(), log).map(|_| ())
}

/// Process `file`, or `stdin` when `file` is `-`.
///
/// Stdin is decoded in the init descriptor's `blueprints.format`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or decoded.
pub fn run_with(
    setup: &CommandSetup,
    file: &Path,
    stdin: &mut dyn Read,
    log: &Logger,
) -> Result<FailureReport> {
    let ctx = &setup.ctx;
    let processor = PackagesProcessor;
    log.stage("packages");

    let (step, report) = if file == Path::new("-") {
        let format = ctx.init.data_format()?;
        let mut data = Vec::new();
        stdin
            .read_to_end(&mut data)
            .context("failed to read blueprint from stdin")?;
        ("packages (stdin)".to_string(), processor.process_data(ctx, &data, format)?)
    } else {
        (
            format!("packages/{}", file.display()),
            processor.process_file(ctx, file)?,
        )
    };

    if !report.is_empty() {
        log.record_step(&step, StepStatus::Partial, Some(&format!("{} failed", report.len())));
    } else if ctx.dry_run {
        log.record_step(&step, StepStatus::DryRun, None);
    } else {
        log.record_step(&step, StepStatus::Ok, None);
    }
    finish(log)?;
    Ok(report)
}
