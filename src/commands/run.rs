//! Command: run every category of the blueprint tree.
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, finish};
use crate::cli::{GlobalOpts, RunOpts};
use crate::logging::Logger;
use crate::tasks::{self, CategoryFilter, FailureReport};

/// Run the `run` command.
///
/// # Errors
///
/// Returns an error if setup fails or any step failed.
pub fn run(global: &GlobalOpts, opts: &RunOpts, verbose: bool, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, verbose, log.clone())?;
    run_with(&setup, opts, log).map(|_| ())
}

/// Process every category with an already prepared setup.
///
/// Unit failures are reported as warnings and returned; they do not fail
/// the command.
///
/// # Errors
///
/// Returns an error if any step failed.
pub fn run_with(setup: &CommandSetup, opts: &RunOpts, log: &Logger) -> Result<FailureReport> {
    if setup.ctx.dry_run {
        log.info("dry run: no commands will be executed");
    }
    let filter = CategoryFilter {
        only: opts.only.clone(),
        skip: opts.skip.clone(),
    };
    let report = tasks::run_blueprints(
        &setup.ctx,
        &setup.location,
        &tasks::all_processors(),
        &filter,
    );
    finish(log)?;
    Ok(report)
}
