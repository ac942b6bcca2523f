//! Reporting utilities: formatted terminal output for the dataset and aggregates.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

pub mod format;

pub use format::*;
