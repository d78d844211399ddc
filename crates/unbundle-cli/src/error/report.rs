//! Miette diagnostic conversion for CLI errors.
//!
//! The `Hint:` paragraph that engine and config errors end with becomes the diagnostic's help
//! text, so miette renders it separately from the message.

use miette::{MietteDiagnostic, Report};

use crate::error::CliError;

const HINT_MARKER: &str = "\n\nHint: ";

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    let code = code_for(&err);
    let text = err.to_string();

    let diagnostic = match text.split_once(HINT_MARKER) {
        Some((message, hint)) => MietteDiagnostic::new(message).with_help(hint),
        None => MietteDiagnostic::new(text),
    };
    Report::new(diagnostic.with_code(code))
}

fn code_for(err: &CliError) -> &'static str {
    match err {
        CliError::Config(_) => "unbundle::config",
        CliError::InvalidArgument(_) => "unbundle::args",
        CliError::BundleNotFound(_) | CliError::Io(_) => "unbundle::io",
        CliError::Engine(engine) if engine.is_structural() => "unbundle::detection",
        CliError::Engine(unbundle::Error::PathEscapesRoot { .. } | unbundle::Error::UnknownModule(_)) => {
            "unbundle::resolution"
        }
        CliError::Engine(_) => "unbundle::engine",
    }
}
