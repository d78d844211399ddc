//! The reconstruction run.

use std::io::Write as _;
use std::sync::Arc;
use std::time::Instant;

use unbundle::{Bundle, HttpFetcher, NativeRuntime, Options};

use crate::cli::{UnbundleArgs, is_package_name};
use crate::config::load_options;
use crate::error::{CliError, Result};
use crate::ui;

/// Reconstruct the modules of `args.bundle`.
///
/// # Process
///
/// 1. Load options (config file, environment, flags)
/// 2. Open the bundle, folding in its metadata file
/// 3. Parse it, loading lazy chunks from disk or the network
/// 4. Resolve module paths and move package roots under `node_modules/`
/// 5. Write every module (or print the path table with `--dry-run`)
pub async fn execute(args: UnbundleArgs) -> Result<()> {
    let started = Instant::now();

    if !args.bundle.is_file() {
        return Err(CliError::BundleNotFound(args.bundle.clone()));
    }
    if let Some((id, name)) = args.packages.iter().find(|(_, name)| !is_package_name(name)) {
        return Err(CliError::InvalidArgument(format!(
            "--package {id}={name}: not an npm package name"
        )));
    }
    let cwd = std::env::current_dir()?;
    let options = load_options(&args, &cwd)?;

    // Status output follows the log level, so `--quiet` hides it.
    let status = tracing::enabled!(tracing::Level::INFO);
    let spinner = if status && !ui::is_ci() {
        ui::Spinner::new(&format!("Parsing {}", args.bundle.display()))
    } else {
        ui::Spinner::hidden()
    };

    let mut bundle = match open_and_parse(&args, options).await {
        Ok(bundle) => bundle,
        Err(e) => {
            spinner.fail("Reconstruction failed");
            return Err(e);
        }
    };
    spinner.set_message("Resolving module paths");

    let mut diagnostics = bundle.resolve_paths()?;
    for (id, name) in &args.packages {
        bundle.adopt_package(id, name)?;
    }

    let chunks = bundle.chunks().len();
    let modules = bundle.modules().count();

    if args.dry_run {
        spinner.clear();
        let table = ui::format_path_table(&bundle.path_table());
        std::io::stdout().lock().write_all(table.as_bytes())?;
        if status {
            ui::info(&format!("Dry run: {modules} modules, nothing written"));
            report_diagnostics(diagnostics.len());
        }
        return Ok(());
    }

    spinner.set_message("Writing modules");
    let report = bundle.write_all().await?;
    diagnostics.extend(report.diagnostics);

    if args.force_metadata {
        bundle.write_metadata(true).await?;
    }
    spinner.finish(&format!(
        "Wrote {} files to {}",
        report.files.len(),
        bundle.options().dist_path.display()
    ));

    if status {
        report_diagnostics(diagnostics.len());
        ui::print_summary(modules, chunks, diagnostics.len(), started.elapsed());
    }
    Ok(())
}

async fn open_and_parse(args: &UnbundleArgs, options: Options) -> Result<Bundle> {
    let mut bundle = Bundle::open(
        &args.bundle,
        Arc::new(NativeRuntime::new()),
        Arc::new(HttpFetcher::new()),
        options,
    )
    .await?;
    bundle.parse().await?;
    Ok(bundle)
}

/// Diagnostics are logged as the engine finds them; this only points back at them.
fn report_diagnostics(count: usize) {
    if count > 0 {
        ui::warning(&format!(
            "{count} module(s) could not be fully reconstructed, see the warnings above"
        ));
    }
}
