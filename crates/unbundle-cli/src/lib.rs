//! Unbundle CLI - reconstruct module files from bundler output.
//!
//! This crate provides the `unbundle` binary on top of the [`unbundle`] engine.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions (clap derive)
//! - [`config`] - Layered configuration: defaults, config file, environment, flags
//! - [`commands`] - The reconstruction run itself
//! - [`error`] - Error types with actionable hints, rendered through miette
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Spinner, status lines and the path table
//!
//! # Example
//!
//! ```rust,no_run
//! use unbundle_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
