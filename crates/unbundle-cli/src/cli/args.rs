use std::path::PathBuf;

use clap::Args;
use unbundle::ModuleId;

use crate::cli::validation::{parse_assignment, parse_module_id};

/// Arguments of a reconstruction run.
#[derive(Args, Debug, Clone, Default)]
pub struct UnbundleArgs {
    /// Bundle file produced by the bundler
    #[arg(value_name = "BUNDLE")]
    pub bundle: PathBuf,

    /// Output directory for reconstructed modules [default: ./dist]
    #[arg(short = 'd', long = "dist", value_name = "DIR")]
    pub dist: Option<PathBuf>,

    /// Configuration file [default: unbundle.config.json when present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Prefix for remote chunk URLs, e.g. https://example.com
    #[arg(long, value_name = "URL")]
    pub public_path_prefix: Option<String>,

    /// Entry module id, when the bootstrap does not name one
    #[arg(long, value_name = "ID", value_parser = parse_module_id)]
    pub entry: Option<ModuleId>,

    /// Fix the output path of a module (repeatable)
    ///
    /// Example: --known-path 4=./lib/util
    #[arg(long = "known-path", value_name = "ID=PATH", value_parser = parse_assignment)]
    pub known_paths: Vec<(ModuleId, String)>,

    /// Treat a module as the root of an npm package (repeatable)
    ///
    /// The module becomes node_modules/<NAME>/index.js and everything it requires moves
    /// under node_modules/<NAME>/.
    #[arg(long = "package", value_name = "ID=NAME", value_parser = parse_assignment)]
    pub packages: Vec<(ModuleId, String)>,

    /// Emit whole module closures instead of their bodies
    #[arg(long)]
    pub keep_closure: bool,

    /// Rewrite the bundle metadata file even if it already exists
    #[arg(long)]
    pub force_metadata: bool,

    /// Analyse and print the module paths without writing any module
    #[arg(long)]
    pub dry_run: bool,
}
