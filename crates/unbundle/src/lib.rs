#![cfg_attr(docsrs, feature(doc_cfg))]

//! # unbundle
//!
//! Unbundle engine - recovers the module graph and the original module files from webpack and
//! browserify style bundles.
//!
//! ```text
//! bundle.js ──▶ bootstrap ──▶ closure roles ──▶ module table ──▶ dependency edges
//!                                                                     │
//!          lazy chunks (disk, then HTTP) ◀────── chunk loads ◀────────┤
//!                                                                     ▼
//! dist/**.js ◀── rewrite ◀── path resolution ◀────────────────── module graph
//! ```
//!
//! ## Features
//!
//! - **Bootstrap detection**: finds the bundler runtime by shape, so minified bundles work
//! - **Role inference**: works out which closure parameter is `require`, `module` and `exports`
//! - **Lazy chunks**: follows `require.e(id)` into split chunk files, locally or over HTTP
//! - **Path inference**: names files after the require strings that reach them
//! - **Persisted corrections**: non-default options and known paths live in `<bundle>.info.json`
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use unbundle::{Bundle, HttpFetcher, NativeRuntime, Options};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut bundle = Bundle::open(
//!     "./build/app.js",
//!     Arc::new(NativeRuntime::new()),
//!     Arc::new(HttpFetcher::new()),
//!     Options::default(),
//! )
//! .await?;
//!
//! bundle.parse().await?;
//! for diagnostic in bundle.resolve_paths()? {
//!     eprintln!("{diagnostic}");
//! }
//! bundle.write_all().await?;
//! # Ok(()) }
//! ```

pub mod bootstrap;
pub mod bundle;
pub mod chunk;
pub mod diagnostic;
pub mod error;
mod extract;
pub mod fetch;
pub mod graph;
pub mod metadata;
pub mod module;
pub mod module_id;
pub mod options;
pub mod paths;
pub mod rewrite;
pub mod roles;
pub mod runtime;
mod table;

mod syntax;

// Test utilities (available in test builds and when test-utils feature is enabled)
#[cfg(any(test, doctest, feature = "test-utils"))]
pub mod test_utils;

pub mod native_runtime;
pub use native_runtime::NativeRuntime;

#[cfg(test)]
mod tests;

pub use bootstrap::{Bootstrap, BundleKind};
pub use bundle::{Bundle, WriteReport};
pub use chunk::{Chunk, DEFAULT_CHUNK};
pub use diagnostic::Diagnostic;
pub use error::{Error, Result};
pub use fetch::{ChunkFetcher, FetchError, HttpFetcher};
pub use graph::{GraphNode, ModuleGraph};
pub use metadata::{BundleMetadata, METADATA_VERSION, ModuleOverride};
pub use module::{DependencyEdge, DependencyKind, Module};
pub use module_id::{ChunkId, ModuleId, ModuleIdError};
pub use options::{DEFAULT_MAX_CHUNK_DEPTH, HttpOptions, Options};
pub use paths::{PathResolver, PathTable, Step};
pub use rewrite::{RenderOptions, Rendered, require_path};
pub use roles::{ClosureRoles, Role};
pub use runtime::{Runtime, RuntimeError, RuntimeResult};

// Re-export OXC foundation types so downstream crates parse with the same version
pub mod oxc {
    //! OXC types re-exported for consumers that inspect bundle sources themselves.

    /// Re-export allocator - required for all OXC AST operations
    pub use oxc_allocator::Allocator;

    /// Re-export AST types
    pub use oxc_ast::ast;

    /// Re-export span types for source location tracking
    pub use oxc_span::{GetSpan, SourceType, Span};

    /// Re-export parser
    pub use oxc_parser::{Parser, ParserReturn};

    /// Re-export semantic analysis
    pub use oxc_semantic::SemanticBuilder;
}
