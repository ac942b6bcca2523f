//! Input/output helpers.
//!
//! - dataset CSV export (`export`)
//! - aggregate JSON read/write (`aggregates`)

pub mod aggregates;
pub mod export;

pub use aggregates::*;
pub use export::*;
