//! Phantom CLI entry point.
//!
//! Parses arguments, installs logging, dispatches to a command and turns
//! any error into a miette report with a non-zero exit status.

use clap::Parser;
use phantom_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build::execute(build_args).await,
        cli::Command::Check(check_args) => commands::check::execute(check_args).await,
        cli::Command::Script(script_args) => commands::script::execute(script_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
