//! Command-line interface definition for Phantom.
//!
//! - `phantom build` - bundle the configured entries
//! - `phantom check` - validate configuration, entries, plugins and engines
//! - `phantom script` - generate the engine runner for a URL

mod commands;
pub mod enums;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command, ScriptArgs};
pub use enums::BundleModeArg;

/// Phantom - bundle browser-automation scripts with lifecycle plugins
#[derive(Parser, Debug)]
#[command(
    name = "phantom",
    version,
    about = "Bundle browser-automation scripts with lifecycle plugins",
    long_about = "Phantom bundles Puppeteer and Playwright scripts into standalone ES modules.\n\
                  Plugins listed in phantomvite.config.json are aggregated behind the\n\
                  `virtual:phantom-plugins` module and receive onStart, onPageLoad and onExit hooks."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
