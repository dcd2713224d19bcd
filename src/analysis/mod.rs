//! Analyses over the IR.
//!
//! Terminology note: analyses here only read the code, with one
//! exception: liveness records whether each use kills its value in the
//! operand's `kill` flag.

pub mod liveness;
pub use liveness::*;
pub mod pressure;
pub use pressure::*;
mod worklist;
pub use worklist::Worklist;
