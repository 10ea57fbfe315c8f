mod calculation_result;
mod rate_band;
mod rate_table;

pub use calculation_result::CalculationResult;
pub use rate_band::RateBand;
pub use rate_table::{ConfigurationError, RateTable};
