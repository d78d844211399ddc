//! Configuration for a reconstruction run.
//!
//! Engine [`Options`](unbundle::Options) are assembled from, lowest priority first:
//!
//! 1. built-in defaults
//! 2. `unbundle.config.json` in the working directory, or the file given with `--config`
//! 3. `UNBUNDLE_*` environment variables (`UNBUNDLE_DIST_PATH`, `UNBUNDLE_MAX_CHUNK_DEPTH`, ...)
//! 4. command-line flags
//!
//! The bundle's own metadata file is folded in afterwards by the engine when the bundle is
//! opened; anything set here wins over it.

mod loading;
mod tests;

pub use loading::{CONFIG_FILE_NAME, ENV_PREFIX, load_options};
