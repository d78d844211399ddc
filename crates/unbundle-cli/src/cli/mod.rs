//! Command-line interface definition.
//!
//! `unbundle` has a single mode of operation, so the arguments live directly on [`Cli`] rather
//! than under subcommands.

mod args;
mod tests;
mod validation;

use clap::Parser;

pub use args::UnbundleArgs;
pub use validation::{is_package_name, parse_assignment, parse_module_id};

/// unbundle - recover the original module files from a webpack bundle
#[derive(Parser, Debug)]
#[command(
    name = "unbundle",
    version,
    about = "Recover the original module files from a webpack bundle",
    long_about = "unbundle locates the bundler runtime in a webpack-style bundle, follows every\n\
                  require between the embedded modules (including lazily loaded chunks) and\n\
                  writes each module back out under a path inferred from its require strings."
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

    #[command(flatten)]
    pub unbundle: UnbundleArgs,
}
