use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::BundleModeArg;

/// Available Phantom subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bundle automation scripts
    ///
    /// Resolves the configured entries, aggregates the configured plugins and
    /// writes one ES module per entry to the output directory.
    Build(BuildArgs),

    /// Validate configuration, entries, plugins and the automation engine
    ///
    /// Nothing is bundled or written.
    Check(CheckArgs),

    /// Generate the engine runner script for one URL
    ///
    /// The script launches the configured engine with the configured
    /// headless mode and viewport and calls the plugin hooks around the visit.
    Script(ScriptArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Configuration file (default: phantomvite.config.json in the project)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Which bare imports stay external
    ///
    /// Overrides `bundleMode` from the configuration and PHANTOM_BUNDLE_MODE.
    #[arg(short = 'm', long, value_enum)]
    pub bundle_mode: Option<BundleModeArg>,

    /// Output directory, relative to the project root
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Project root (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Fail instead of replacing existing output files
    #[arg(long)]
    pub no_overwrite: bool,
}

/// Arguments for the check command
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Configuration file (default: phantomvite.config.json in the project)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Print the synthesized `virtual:phantom-plugins` module to stdout
    #[arg(long)]
    pub print_virtual: bool,
}

/// Arguments for the script command
#[derive(Args, Debug, Clone, Default)]
pub struct ScriptArgs {
    /// URL the runner visits
    #[arg(value_name = "URL")]
    pub url: String,

    /// Configuration file (default: phantomvite.config.json in the project)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Engine to generate for (puppeteer, playwright, selenium)
    ///
    /// Overrides `engine` from the configuration and PHANTOM_ENGINE.
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Write the script into this directory instead of printing it
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}
