//! Plugins that ship with the runtime.

mod logger;
mod seo;

pub use logger::LoggerPlugin;
pub use seo::{SeoFinding, SeoPlugin};
