use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Top-level CLI entry point for the provisioning engine.
#[derive(Parser, Debug)]
#[command(
    name = "rwr",
    about = "Provision a machine from declarative blueprint files",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (also echoes command output)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Settings file (defaults to $XDG_CONFIG_HOME/rwr/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the blueprint directory (repository.blueprints.localPath)
    #[arg(long, global = true)]
    pub blueprints: Option<PathBuf>,

    /// Log the commands that would run without running them
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Process the packages of one blueprint file concurrently
    #[arg(long, global = true)]
    pub parallel: bool,

    /// Pull the blueprint repository before running
    #[arg(long, global = true)]
    pub update: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every category of the blueprint tree in order
    Run(RunOpts),
    /// Process a single package blueprint file
    Packages(PackagesOpts),
    /// Print the resolved category and file order
    Order,
    /// Generate shell completions
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

/// Options for the `run` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct RunOpts {
    /// Run only these categories
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these categories
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,
}

/// Options for the `packages` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct PackagesOpts {
    /// Blueprint file, or `-` to read from stdin in the init descriptor's format
    pub file: PathBuf,
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
