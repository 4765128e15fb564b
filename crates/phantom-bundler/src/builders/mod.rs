//! Running Rolldown over resolved entries.

mod build_executor;

pub use build_executor::{BuildResult, build};
