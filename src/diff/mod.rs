//! Diff/patch engine: computes the ordered mutation list between two trees.

pub mod engine;
pub(crate) mod keyed;
pub mod patch;

pub use engine::{diff, diff_with, DiffOptions, DuplicateKeyPolicy};
pub use patch::{NodePath, ParsePathError, Patch};
