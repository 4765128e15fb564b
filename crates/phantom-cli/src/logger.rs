//! Logging setup for the Phantom CLI.
//!
//! Library crates only emit `tracing` events; the binary installs the one
//! subscriber. Events go to stderr so `check --print-virtual` keeps stdout
//! clean.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str =
    "phantom_cli=debug,phantom_bundler=debug,phantom_config=debug,phantom_runtime=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str =
    "phantom_cli=info,phantom_bundler=info,phantom_config=info,phantom_runtime=info";

/// Pick the filter for the given flags.
///
/// `--verbose` wins over `--quiet`; without either, `RUST_LOG` is honoured
/// and falls back to info level for the phantom crates.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_overrides_quiet() {
        let filter = filter_for(true, true).to_string();
        assert!(filter.contains("phantom_bundler=debug"));
    }

    #[test]
    fn quiet_keeps_only_errors() {
        assert_eq!(filter_for(false, true).to_string(), "error");
    }
}
