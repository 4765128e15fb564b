//! Phantom CLI - bundle browser-automation scripts and their lifecycle plugins.
//!
//! The binary is a thin shell over the library crates:
//!
//! - [`cli`] - argument definitions (clap derive)
//! - [`commands`] - `build` and `check`
//! - [`error`] - [`CliError`] and its conversion to miette reports
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and the build summary
//!
//! ```rust,no_run
//! use phantom_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
