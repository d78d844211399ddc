//! Command implementations.
//!
//! - [`unbundle`] - reconstruct the modules of a bundle

pub mod unbundle;

pub use unbundle::execute as unbundle_execute;
