//! Withholding calculation modules.
//!
//! The tiered calculator implements the simplified progressive method: one
//! flat rate applied to the whole amount, corrected by a precomputed
//! subtraction, instead of iterating over every lower band.

pub mod common;
pub mod tiered;

pub use tiered::{EvaluationError, InvalidInputError, TieredRateCalculator};
