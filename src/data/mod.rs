//! Dataset production: generation, derived columns, and session assembly.

pub mod assembler;
pub mod derive;
pub mod generator;

pub use assembler::{Assembler, assemble};
pub use derive::{derive_all, derive_fields};
pub use generator::generate_rows;
