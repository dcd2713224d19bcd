//! Sparse bitsets and SSA liveness analysis.
//!
//! The `bitset` module provides `SparseBitSet`, a set of `u32` indices
//! that only stores the regions of a huge index space that actually
//! hold members. The `analysis` module computes per-block live-in and
//! live-out sets of SSA values with it, and marks killing uses.

pub mod analysis;
pub mod bitset;
pub mod entity;
mod errors;
pub mod frontend;
mod ir;

pub use analysis::{Liveness, LivenessFunction, LivenessOptions};
pub use bitset::{BitSetOptions, SparseBitSet};
pub use errors::*;
pub use ir::*;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
