//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - categorical labels (`Category`, `Region`)
//! - the synthetic observation (`Row`) and its derived columns
//! - the immutable `Dataset` and the config that determines it

pub mod types;

pub use types::*;
