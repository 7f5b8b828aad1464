//! Snapshot diffing.
//!
//! [`diff`] compares two forests and returns the ordered [`Patch`] sequence
//! that turns a live tree matching the old one into one matching the new.

mod differ;
mod patch;

pub use differ::{diff, diff_trees};
pub use patch::{Patch, PatchKind};
