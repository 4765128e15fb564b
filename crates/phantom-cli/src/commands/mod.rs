//! Command implementations.
//!
//! - [`build`] - bundle the configured entries
//! - [`check`] - validate without building
//! - [`script`] - generate an engine runner script
//!
//! Each command exposes an `execute` function taking its parsed arguments.

pub mod build;
pub mod check;
pub mod script;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
pub use script::execute as script_execute;
