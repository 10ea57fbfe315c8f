use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;
use crate::models::RateBand;

/// Result of evaluating a base amount against a rate table.
///
/// A fresh value is produced on every evaluation; nothing is cached or
/// shared between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// The input amount, echoed back.
    pub base_amount: Decimal,

    /// The band the amount fell into.
    pub matched_band: RateBand,

    /// The amount withheld. Never negative: a raw deduction below zero is
    /// floored to exactly zero.
    pub computed_deduction: Decimal,

    /// `base_amount - computed_deduction`.
    pub net_amount: Decimal,

    /// `true` iff `computed_deduction` is exactly zero after the floor.
    pub is_exempt: bool,
}

impl CalculationResult {
    /// Copy with the deduction rounded to cents (half-up) and the net
    /// amount recomputed from the rounded deduction.
    ///
    /// Evaluation itself never rounds, so sums over many results stay
    /// exact; round at the edge, when a value is displayed or written to a
    /// report line.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use withholding_core::{CalculationResult, RateBand};
    ///
    /// let result = CalculationResult {
    ///     base_amount: dec!(100.01),
    ///     matched_band: RateBand {
    ///         lower_bound: dec!(100.01),
    ///         upper_bound: Some(dec!(200)),
    ///         rate: dec!(20),
    ///         subtract_amount: dec!(15),
    ///         label: "20%".to_string(),
    ///     },
    ///     computed_deduction: dec!(5.002),
    ///     net_amount: dec!(95.008),
    ///     is_exempt: false,
    /// };
    ///
    /// let rounded = result.rounded();
    /// assert_eq!(rounded.computed_deduction, dec!(5.00));
    /// assert_eq!(rounded.net_amount, dec!(95.01));
    /// ```
    pub fn rounded(&self) -> Self {
        let computed_deduction = round_half_up(self.computed_deduction);
        Self {
            base_amount: self.base_amount,
            matched_band: self.matched_band.clone(),
            computed_deduction,
            net_amount: self.base_amount - computed_deduction,
            is_exempt: self.is_exempt,
        }
    }
}
