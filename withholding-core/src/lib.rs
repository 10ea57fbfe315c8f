pub mod calculations;
pub mod models;

pub use calculations::{EvaluationError, InvalidInputError, TieredRateCalculator};
pub use models::*;
