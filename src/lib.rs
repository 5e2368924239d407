//! Blueprint-driven machine provisioning engine.
//!
//! Locates a blueprint tree (optionally syncing it from a git remote), reads
//! its init descriptor, and runs each category's blueprints in the declared
//! order. Package blueprints are expanded into units of work, resolved
//! against the package-manager registry, and executed one by one; unit
//! failures are collected and reported without stopping the run.
//!
//! The public API is organised into four layers:
//!
//! - **[`blueprints`]**: source locator, init descriptor, run order, decoding
//! - **[`resources`]**: package-manager registry and package commands
//! - **[`tasks`]**: per-category processors and failure aggregation
//! - **[`commands`]**: top-level subcommand orchestration (`run`, `packages`, `order`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod blueprints;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod tasks;
