//! Dispatch Module
//!
//! Shape classification and per-direction routing between cache and engine.

mod input;
mod router;

pub use input::{FormulaInput, FormulaOutput, IntoFormulaInput};
pub use router::{Backward, DispatchRouter, Forward, Route};
