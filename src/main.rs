use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use rwr_cli::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    let command = match &args.command {
        cli::Command::Run(_) => "run",
        cli::Command::Packages(_) => "packages",
        cli::Command::Order => "order",
        cli::Command::Completions(opts) => {
            commands::completions::run(opts.shell);
            return Ok(());
        }
        cli::Command::Version => {
            commands::version::run();
            return Ok(());
        }
    };

    logging::init_subscriber(args.verbose, command);
    let log = Arc::new(logging::Logger::new(command));
    tracing::debug!("rwr {}", commands::version::version());

    match args.command {
        cli::Command::Run(opts) => commands::run::run(&args.global, &opts, args.verbose, &log),
        cli::Command::Packages(opts) => {
            commands::packages::run(&args.global, &opts, args.verbose, &log)
        }
        cli::Command::Order => commands::order::run(&args.global, &log),
        cli::Command::Completions(_) | cli::Command::Version => Ok(()),
    }
}
