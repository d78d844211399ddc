//! Error types for the unbundle engine.
//!
//! Variants are grouped the way an operator reacts to them:
//!
//! - **Structural detection** (`BootstrapNotFound`, `ModuleTable`, `RoleResolution`,
//!   `ChunkModuleList`): the bundle does not look like a supported bundler output. These carry
//!   a hint pointing at the `bootstrapOffset` override.
//! - **Extraction contract** (`TooManyArguments`): the static-require assumption was violated.
//! - **Resolution** (`PathEscapesRoot`, `UnknownModule`): fixable by adding `knownPaths`.
//! - **I/O** (`ChunkUnavailable`, `Runtime`, `Metadata`).

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;
use crate::module_id::{ChunkId, ModuleId, ModuleIdError};
use crate::runtime::RuntimeError;

/// Result type alias using the engine [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The source text could not be parsed.
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// No function in the program has the shape of a module bootstrap.
    #[error(
        "Could not find the module bootstrap in {}. The bootstrap is the function that \
         invokes each module closure with `.call(module.exports, module, module.exports, require)`.\
         \n\nHint: Locate it by hand and set `bootstrapOffset` (byte offset of the function) in {}",
        .path.display(),
        .metadata.display()
    )]
    BootstrapNotFound { path: PathBuf, metadata: PathBuf },

    /// The bootstrap was found but its module table could not be read.
    #[error(
        "Module table in {} is not usable: {reason}\n\nHint: Check `bootstrapOffset` in the bundle metadata",
        .path.display()
    )]
    ModuleTable { path: PathBuf, reason: String },

    /// The module invocation call site does not follow the expected calling convention.
    #[error(
        "Could not assign closure parameter roles: {0}\n\nHint: Only bundles that pass \
         (module, exports, require) to each closure are supported"
    )]
    RoleResolution(String),

    /// A direct require call was given more than one argument.
    #[error("Module {module} calls require with {count} arguments, but exactly one is expected")]
    TooManyArguments { module: ModuleId, count: usize },

    /// A resolved module path walks above the output root.
    #[error(
        "Module {module} resolves to '{path}', which is outside the output directory. \
         Not enough information to name the files; define the path of one of:\n{candidates}\
         \n\nHint: Add an entry to `knownPaths` in the bundle metadata"
    )]
    PathEscapesRoot {
        module: ModuleId,
        path: String,
        candidates: String,
    },

    /// A module id that no chunk defines.
    #[error("Module {0} is not defined by any chunk")]
    UnknownModule(ModuleId),

    /// A lazy chunk could be found neither next to the bundle nor remotely.
    #[error(
        "Chunk {chunk} could not be loaded.\n  local: {} ({local_error})\n  remote: {url} ({remote_error})",
        .local.display()
    )]
    ChunkUnavailable {
        chunk: ChunkId,
        local: PathBuf,
        local_error: RuntimeError,
        url: String,
        remote_error: FetchError,
    },

    /// A chunk file was loaded but no module list could be found in it.
    #[error("Could not generate module list for chunk file {}", .path.display())]
    ChunkModuleList { path: PathBuf },

    /// Lazy chunk discovery went deeper than allowed.
    #[error("Chunk {chunk} is nested deeper than the maximum chunk depth of {max_depth}")]
    MaxChunkDepth { chunk: ChunkId, max_depth: usize },

    /// The metadata file exists but cannot be used.
    #[error("Malformed metadata file {}: {reason}", .path.display())]
    Metadata { path: PathBuf, reason: String },

    /// A literal could not be turned into a module id.
    #[error("Invalid module id: {0}")]
    InvalidModuleId(#[from] ModuleIdError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn module_table(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ModuleTable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the error belongs to the structural detection class.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::BootstrapNotFound { .. }
                | Self::ModuleTable { .. }
                | Self::RoleResolution(_)
                | Self::ChunkModuleList { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_error_names_override() {
        let err = Error::BootstrapNotFound {
            path: PathBuf::from("/tmp/app.js"),
            metadata: PathBuf::from("/tmp/app.js.info.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/app.js"));
        assert!(msg.contains("bootstrapOffset"));
        assert!(msg.contains("Hint:"));
        assert!(err.is_structural());
    }

    #[test]
    fn too_many_arguments_names_module() {
        let err = Error::TooManyArguments {
            module: ModuleId::Index(7),
            count: 2,
        };
        assert!(err.to_string().contains("Module 7"));
        assert!(!err.is_structural());
    }

    #[test]
    fn escape_error_lists_candidates() {
        let err = Error::PathEscapesRoot {
            module: ModuleId::Index(3),
            path: "../x".into(),
            candidates: "- ../x (1)".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("- ../x (1)"));
        assert!(msg.contains("knownPaths"));
    }
}
