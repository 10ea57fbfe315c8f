use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tier of a withholding rate table.
///
/// The rate applies to the *entire* base amount, not just the portion above
/// `lower_bound`; `subtract_amount` is the precomputed correction that makes
/// this flat application equivalent to true marginal bracketing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBand {
    /// Inclusive minimum amount for this band.
    pub lower_bound: Decimal,
    /// Inclusive maximum amount for this band. `None` means unbounded; a
    /// valid table ends with exactly one unbounded band.
    pub upper_bound: Option<Decimal>,
    /// Percentage rate, e.g. `7.5` for 7.5%.
    pub rate: Decimal,
    /// Fixed amount subtracted after applying the rate.
    pub subtract_amount: Decimal,
    /// Human-readable description. Display only.
    pub label: String,
}

impl RateBand {
    /// Returns `true` if `amount` falls inside this band (inclusive on both
    /// ends).
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.lower_bound && self.upper_bound.is_none_or(|upper| amount <= upper)
    }
}
