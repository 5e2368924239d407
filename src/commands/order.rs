//! Command: print the resolved run order.
use std::fmt::Write as _;

use anyhow::Result;

use super::{LoadedBlueprints, load_blueprints};
use crate::blueprints::git::Git2Transport;
use crate::blueprints::order::{category_files, resolve_category_order};
use crate::cli::GlobalOpts;
use crate::logging::Logger;

/// Run the `order` command.
///
/// # Errors
///
/// Returns an error if the blueprints cannot be loaded or a category
/// directory cannot be listed.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let loaded = load_blueprints(global, &Git2Transport, log)?;
    print!("{}", render(&loaded)?);
    Ok(())
}

/// One line per category, followed by its files in run order.
///
/// # Errors
///
/// Returns an error if a category directory cannot be listed.
pub fn render(loaded: &LoadedBlueprints) -> Result<String> {
    let mut out = String::new();
    for category in resolve_category_order(&loaded.init) {
        let files = category_files(&loaded.location, &loaded.init, &category)?;
        writeln!(out, "{category}")?;
        for file in files {
            writeln!(out, "  {}", file.display())?;
        }
    }
    Ok(out)
}
