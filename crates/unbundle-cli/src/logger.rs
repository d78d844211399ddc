//! Logging setup for the unbundle CLI.
//!
//! The engine reports discovery steps at `debug`, run milestones at `info` and non-fatal
//! findings (dangling requires, unreachable modules) at `warn`. This module decides which of
//! those reach the terminal.
//!
//! # Example
//!
//! ```rust,no_run
//! use unbundle_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("Starting reconstruction");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "unbundle=debug,unbundle_cli=debug";
const QUIET_FILTER: &str = "unbundle=error,unbundle_cli=error";
const DEFAULT_FILTER: &str = "unbundle=info,unbundle_cli=info";

/// Pick the filter directives for the given flags.
///
/// `--verbose` wins over `--quiet`; without either, `RUST_LOG` is honoured when set.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logging with a caller-supplied filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    // A second initialisation (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
