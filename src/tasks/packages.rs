//! Package orchestration: expand entries into units, run each unit's
//! command, and collect unit failures without stopping.
use std::path::Path;
use std::sync::Arc;

use super::{Context, FailureReport, Processor};
use crate::blueprints::packages::{self, PackageEntry, PackageUnit};
use crate::config::format::Format;
use crate::error::{BlueprintError, PackageError};
use crate::logging::{BufferedLog, Log};
use crate::resources::package::PackageResource;
use crate::resources::{Applicable, ResourceChange};

/// Processor for the `packages` category.
#[derive(Debug, Default, Clone, Copy)]
pub struct PackagesProcessor;

impl Processor for PackagesProcessor {
    fn category(&self) -> &'static str {
        "packages"
    }

    fn process_file(&self, ctx: &Context, path: &Path) -> Result<FailureReport, BlueprintError> {
        ctx.log.debug(&format!("reading blueprint file {}", path.display()));
        let entries = packages::read_file(path)?;
        ctx.log.info(&format!("processing packages from {}", path.display()));
        Ok(process_entries(ctx, &entries))
    }

    fn process_data(
        &self,
        ctx: &Context,
        data: &[u8],
        format: Format,
    ) -> Result<FailureReport, BlueprintError> {
        let entries = packages::decode(data, format)?;
        ctx.log.debug(&format!("processing {} package entries from data", entries.len()));
        Ok(process_entries(ctx, &entries))
    }

    fn process_inline(&self, ctx: &Context) -> Option<FailureReport> {
        if ctx.init.packages.is_empty() {
            return None;
        }
        ctx.log.info("processing packages from the init descriptor");
        Some(process_entries(ctx, &ctx.init.packages))
    }
}

/// Run every unit of `entries` and return the failures.
///
/// Units run in declaration order, or concurrently when `ctx.parallel` is
/// set; either way the report lists failures in declaration order. A
/// non-empty report is logged as warnings before returning.
#[must_use]
pub fn process_entries(ctx: &Context, entries: &[PackageEntry]) -> FailureReport {
    let units: Vec<PackageUnit> = entries.iter().flat_map(PackageEntry::units).collect();
    ctx.log.debug(&format!("{} package units to process", units.len()));

    let outcomes = if ctx.parallel && units.len() > 1 {
        process_parallel(ctx, &units)
    } else {
        units
            .iter()
            .map(|unit| process_unit(ctx, ctx.log.as_ref(), unit))
            .collect()
    };

    let mut report = FailureReport::new();
    for (unit, outcome) in units.iter().zip(outcomes) {
        if let Err(error) = outcome {
            ctx.log.debug(&format!("{}: {error}", unit.name));
            report.record(unit.name.clone(), error);
        }
    }
    report.warn(ctx.log.as_ref());
    report
}

/// Process units with Rayon, giving each unit a buffered logger that is
/// flushed in declaration order afterwards.
fn process_parallel(
    ctx: &Context,
    units: &[PackageUnit],
) -> Vec<Result<ResourceChange, PackageError>> {
    use rayon::prelude::*;
    let results: Vec<_> = units
        .par_iter()
        .map(|unit| {
            let log = BufferedLog::new(Arc::clone(&ctx.log));
            let outcome = process_unit(ctx, &log, unit);
            (log, outcome)
        })
        .collect();
    results
        .into_iter()
        .map(|(log, outcome)| {
            log.flush();
            outcome
        })
        .collect()
}

/// Resolve and run one unit.
fn process_unit(
    ctx: &Context,
    log: &dyn Log,
    unit: &PackageUnit,
) -> Result<ResourceChange, PackageError> {
    let resource = PackageResource::resolve(unit, &ctx.registry, ctx.executor.as_ref(), ctx.debug)?;
    if ctx.dry_run {
        log.dry_run(&format!("would run: {}", resource.command()));
        return Ok(ResourceChange::Skipped {
            reason: "dry run".to_string(),
        });
    }
    log.info(&resource.description());
    resource.apply()
}
