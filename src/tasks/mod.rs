//! Category dispatch: walk the run order and hand each category's blueprints
//! to its processor.
pub mod context;
pub mod packages;
pub mod report;

use std::path::Path;

pub use context::Context;
pub use report::{Failure, FailureReport};

use crate::blueprints::order::{category_dir, category_files, resolve_category_order};
use crate::blueprints::source::BlueprintLocation;
use crate::config::format::Format;
use crate::error::BlueprintError;
use crate::logging::StepStatus;

/// Handles the blueprints of one category.
pub trait Processor: Send + Sync {
    /// Category name, matched against the run order.
    fn category(&self) -> &str;

    /// Process one blueprint file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded. Unit
    /// failures are returned in the report instead.
    fn process_file(&self, ctx: &Context, path: &Path) -> Result<FailureReport, BlueprintError>;

    /// Process a pre-resolved blueprint buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer cannot be decoded.
    fn process_data(
        &self,
        ctx: &Context,
        data: &[u8],
        format: Format,
    ) -> Result<FailureReport, BlueprintError>;

    /// Process the category's records inlined in the init descriptor.
    ///
    /// Returns `None` when there are none.
    fn process_inline(&self, ctx: &Context) -> Option<FailureReport>;
}

/// Every processor the engine ships.
#[must_use]
pub fn all_processors() -> Vec<Box<dyn Processor>> {
    vec![Box::new(packages::PackagesProcessor)]
}

/// `--only` / `--skip` category selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    /// When non-empty, only these categories run.
    pub only: Vec<String>,
    /// Categories that never run.
    pub skip: Vec<String>,
}

impl CategoryFilter {
    /// Whether `category` passes the filter (case-insensitive).
    #[must_use]
    pub fn includes(&self, category: &str) -> bool {
        let eq = |other: &String| other.eq_ignore_ascii_case(category);
        if !self.only.is_empty() && !self.only.iter().any(eq) {
            return false;
        }
        !self.skip.iter().any(eq)
    }
}

/// Walk the category run order and process every category.
///
/// Inline init records run before the category's files, and files run in
/// resolved order. A file that cannot be read or decoded is logged and
/// recorded as a failed step; the remaining files still run. Categories
/// without a processor are recorded as not applicable.
///
/// Returns every unit failure of the run, in order.
pub fn run_blueprints(
    ctx: &Context,
    location: &BlueprintLocation,
    processors: &[Box<dyn Processor>],
    filter: &CategoryFilter,
) -> FailureReport {
    let mut report = FailureReport::new();

    for category in resolve_category_order(&ctx.init) {
        if !filter.includes(&category) {
            ctx.log.debug(&format!("skipping category: {category} (filtered)"));
            continue;
        }
        let Some(processor) = processors.iter().find(|p| p.category() == category) else {
            ctx.log.debug(&format!("skipping category: {category} (no processor)"));
            ctx.log
                .record_step(&category, StepStatus::NotApplicable, Some("no processor"));
            continue;
        };

        ctx.log.stage(&category);

        if let Some(inline) = processor.process_inline(ctx) {
            record_outcome(ctx, &format!("{category} (init)"), &inline);
            report.extend(inline);
        }

        let files = match category_files(location, &ctx.init, &category) {
            Ok(files) => files,
            Err(e) => {
                ctx.log.error(&format!("{category}: {e}"));
                ctx.log
                    .record_step(&category, StepStatus::Failed, Some(&e.to_string()));
                continue;
            }
        };
        if files.is_empty() {
            ctx.log.debug(&format!("no {category} blueprint files"));
        }

        let dir = category_dir(location, &ctx.init, &category);
        for file in files {
            let step = format!("{category}/{}", file.display());
            match processor.process_file(ctx, &dir.join(&file)) {
                Ok(file_report) => {
                    record_outcome(ctx, &step, &file_report);
                    report.extend(file_report);
                }
                Err(e) => {
                    ctx.log.error(&e.to_string());
                    ctx.log
                        .record_step(&step, StepStatus::Failed, Some(&e.to_string()));
                }
            }
        }
    }

    report
}

fn record_outcome(ctx: &Context, step: &str, report: &FailureReport) {
    if !report.is_empty() {
        let message = format!("{} failed", report.len());
        ctx.log.record_step(step, StepStatus::Partial, Some(&message));
    } else if ctx.dry_run {
        ctx.log.record_step(step, StepStatus::DryRun, None);
    } else {
        ctx.log.record_step(step, StepStatus::Ok, None);
    }
}
