//! Unbundle CLI - turn a webpack bundle back into its module files.
//!
//! Parses arguments, initialises logging and colors, runs the reconstruction and renders any
//! error through miette.

use clap::Parser;
use miette::Result;
use unbundle_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    commands::unbundle_execute(args.unbundle)
        .await
        .map_err(error::cli_error_to_miette)
}
