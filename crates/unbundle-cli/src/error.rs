//! Error handling for the unbundle CLI.
//!
//! - **Top-level errors** (`CliError`) are what commands return
//! - **Configuration errors** (`ConfigError`) carry the field and a hint
//! - **Engine errors** pass through untouched; they already explain which metadata field fixes
//!   them
//!
//! Errors reach the terminal through [`cli_error_to_miette`].

use std::path::PathBuf;

use thiserror::Error;

mod report;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (bad config file, invalid environment values)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid command-line arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The bundle to reconstruct does not exist
    #[error("Bundle not found: {}\n\nHint: Pass the path of the bundler output file, e.g. `unbundle dist/main.js`", .0.display())]
    BundleNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors from the reconstruction engine
    #[error(transparent)]
    Engine(#[from] unbundle::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file given with `--config` doesn't exist
    #[error("Config file not found: {}\n\nHint: Create unbundle.config.json or drop --config", .0.display())]
    NotFound(PathBuf),

    /// A layer produced a value of the wrong type
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use unbundle::ModuleId;

    #[test]
    fn config_not_found_has_hint() {
        let err = ConfigError::NotFound(PathBuf::from("unbundle.config.json"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("unbundle.config.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn engine_errors_keep_their_message() {
        let engine = unbundle::Error::UnknownModule(ModuleId::Index(9));
        let expected = engine.to_string();
        let err: CliError = engine.into();
        assert!(matches!(err, CliError::Engine(_)));
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn missing_bundle_names_the_path() {
        let err = CliError::BundleNotFound(PathBuf::from("build/app.js"));
        assert!(err.to_string().contains("build/app.js"));
    }

    #[test]
    fn invalid_value_lists_field_and_hint() {
        let err = ConfigError::InvalidValue {
            field: "maxChunkDepth".to_string(),
            value: "deep".to_string(),
            hint: "Use a positive integer".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid value for 'maxChunkDepth'"));
        assert!(msg.contains("Use a positive integer"));
    }
}
