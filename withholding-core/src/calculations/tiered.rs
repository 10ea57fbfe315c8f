//! Tiered withholding calculation using the simplified progressive method.
//!
//! A rate table divides the non-negative number line into contiguous bands.
//! The band containing the base amount supplies a flat percentage rate and a
//! precomputed subtraction; applying the rate to the *whole* amount and then
//! subtracting the constant yields the same deduction as true
//! marginal-bracket computation, without iterating over the lower bands.
//!
//! # Formula
//!
//! ```text
//! raw       = base_amount × rate / 100 − subtract_amount
//! deduction = max(raw, 0)
//! net       = base_amount − deduction
//! ```
//!
//! The floor at zero is policy, not a safety net: near the bottom of a band
//! the subtraction exceeds the rated amount, and the correct answer there is
//! a zero deduction, which is also what makes a 0% band report as exempt.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use withholding_core::{RateBand, RateTable, TieredRateCalculator};
//!
//! let table = RateTable::new(vec![
//!     RateBand {
//!         lower_bound: dec!(0),
//!         upper_bound: Some(dec!(2428.80)),
//!         rate: dec!(0),
//!         subtract_amount: dec!(0),
//!         label: "exempt".to_string(),
//!     },
//!     RateBand {
//!         lower_bound: dec!(2428.81),
//!         upper_bound: Some(dec!(2826.65)),
//!         rate: dec!(7.5),
//!         subtract_amount: dec!(182.16),
//!         label: "7.5%".to_string(),
//!     },
//!     RateBand {
//!         lower_bound: dec!(2826.66),
//!         upper_bound: None,
//!         rate: dec!(15),
//!         subtract_amount: dec!(394.16),
//!         label: "15%".to_string(),
//!     },
//! ]).unwrap();
//!
//! let calculator = TieredRateCalculator::new(&table);
//! let result = calculator.evaluate(dec!(3000)).unwrap();
//!
//! assert_eq!(result.computed_deduction, dec!(55.84));
//! assert_eq!(result.net_amount, dec!(2944.16));
//! assert!(!result.is_exempt);
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::max;
use crate::models::{CalculationResult, ConfigurationError, RateTable};

/// Errors for base amounts that are outside the calculator's domain.
///
/// [`Decimal`] has no NaN or infinity, so negativity is the entire class of
/// invalid inputs. Callers are expected to parse and sanitize user-entered
/// text before ever reaching this point; this check is the last line of
/// defense, not the UX validation layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidInputError {
    /// The base amount is negative.
    #[error("base amount must be non-negative, got {0}")]
    NegativeAmount(Decimal),
}

/// Errors that can occur when evaluating an amount against a rate table.
///
/// Both kinds are detected synchronously and surfaced immediately. There is
/// no fallback result: fabricating an "exempt" answer for a malformed table
/// would silently corrupt downstream totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvaluationError {
    /// The base amount is outside the valid domain.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// The rate table cannot produce a band for the amount.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Calculator for tiered withholding over a validated rate table.
///
/// A pure, stateless wrapper: it borrows the table and every call to
/// [`evaluate`](Self::evaluate) is an independent, idempotent computation.
/// Invocations need no coordination and may run from any number of threads.
#[derive(Debug, Clone)]
pub struct TieredRateCalculator<'a> {
    table: &'a RateTable,
}

impl<'a> TieredRateCalculator<'a> {
    /// Creates a calculator over the given table.
    pub fn new(table: &'a RateTable) -> Self {
        Self { table }
    }

    /// Evaluates a base amount against the table.
    ///
    /// Selects the single band containing the amount, applies its flat rate
    /// to the whole amount, subtracts the band's adjustment, and floors the
    /// result at zero.
    ///
    /// # Errors
    ///
    /// - [`InvalidInputError::NegativeAmount`] if `base_amount < 0`.
    /// - [`ConfigurationError::NoMatchingBand`] if no band contains the
    ///   amount. Unreachable for a table built by [`RateTable::new`] and a
    ///   non-negative amount, but never masked as an exemption.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use withholding_core::{RateBand, RateTable, TieredRateCalculator};
    ///
    /// let table = RateTable::new(vec![
    ///     RateBand {
    ///         lower_bound: dec!(0),
    ///         upper_bound: Some(dec!(100)),
    ///         rate: dec!(10),
    ///         subtract_amount: dec!(5),
    ///         label: "10%".to_string(),
    ///     },
    ///     RateBand {
    ///         lower_bound: dec!(100.01),
    ///         upper_bound: None,
    ///         rate: dec!(20),
    ///         subtract_amount: dec!(15),
    ///         label: "20%".to_string(),
    ///     },
    /// ]).unwrap();
    ///
    /// let calculator = TieredRateCalculator::new(&table);
    ///
    /// assert_eq!(calculator.evaluate(dec!(100)).unwrap().computed_deduction, dec!(5));
    /// assert_eq!(calculator.evaluate(dec!(100.01)).unwrap().computed_deduction, dec!(5.002));
    /// ```
    pub fn evaluate(
        &self,
        base_amount: Decimal,
    ) -> Result<CalculationResult, EvaluationError> {
        if base_amount < Decimal::ZERO {
            return Err(InvalidInputError::NegativeAmount(base_amount).into());
        }

        let band = self
            .table
            .find_band(base_amount)
            .ok_or(ConfigurationError::NoMatchingBand(base_amount))?;

        debug!(
            amount = %base_amount,
            band = %band.label,
            rate = %band.rate,
            "matched rate band"
        );

        let raw_deduction =
            base_amount * band.rate / Decimal::ONE_HUNDRED - band.subtract_amount;
        if raw_deduction < Decimal::ZERO && band.rate > Decimal::ZERO {
            warn!(
                amount = %base_amount,
                band = %band.label,
                raw = %raw_deduction,
                "raw deduction below zero, floored"
            );
        }
        let computed_deduction = max(raw_deduction, Decimal::ZERO);

        Ok(CalculationResult {
            base_amount,
            matched_band: band.clone(),
            computed_deduction,
            net_amount: base_amount - computed_deduction,
            is_exempt: computed_deduction == Decimal::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::RateBand;

    fn band(
        lower: Decimal,
        upper: Option<Decimal>,
        rate: Decimal,
        subtract: Decimal,
        label: &str,
    ) -> RateBand {
        RateBand {
            lower_bound: lower,
            upper_bound: upper,
            rate,
            subtract_amount: subtract,
            label: label.to_string(),
        }
    }

    /// The monthly withholding table the calculator was built for.
    fn monthly_table() -> RateTable {
        RateTable::new(vec![
            band(dec!(0), Some(dec!(2428.80)), dec!(0), dec!(0), "exempt"),
            band(
                dec!(2428.81),
                Some(dec!(2826.65)),
                dec!(7.5),
                dec!(182.16),
                "7.5%",
            ),
            band(
                dec!(2826.66),
                Some(dec!(3751.05)),
                dec!(15),
                dec!(394.16),
                "15%",
            ),
            band(
                dec!(3751.06),
                Some(dec!(4664.68)),
                dec!(22.5),
                dec!(675.49),
                "22.5%",
            ),
            band(dec!(4664.69), None, dec!(27.5), dec!(908.73), "27.5%"),
        ])
        .unwrap()
    }

    fn boundary_table() -> RateTable {
        RateTable::new(vec![
            band(dec!(0), Some(dec!(100)), dec!(10), dec!(5), "10%"),
            band(dec!(100.01), Some(dec!(200)), dec!(20), dec!(15), "20%"),
            band(dec!(200.01), None, dec!(30), dec!(35), "30%"),
        ])
        .unwrap()
    }

    // =========================================================================
    // exemption tests (canonical monthly table)
    // =========================================================================

    #[test]
    fn evaluate_reports_exempt_in_zero_rate_band() {
        let table = monthly_table();
        let calculator = TieredRateCalculator::new(&table);

        let result = calculator.evaluate(dec!(2000)).unwrap();

        assert!(result.is_exempt);
        assert_eq!(result.computed_deduction, dec!(0));
        assert_eq!(result.net_amount, dec!(2000));
        assert_eq!(result.matched_band.label, "exempt");
    }

    #[test]
    fn evaluate_computes_mid_band_deduction() {
        let table = monthly_table();
        let calculator = TieredRateCalculator::new(&table);

        let result = calculator.evaluate(dec!(3000)).unwrap();

        assert_eq!(result.matched_band.rate, dec!(15));
        assert_eq!(result.computed_deduction, dec!(55.84));
        assert_eq!(result.net_amount, dec!(2944.16));
        assert!(!result.is_exempt);
    }

    #[test]
    fn evaluate_computes_top_band_deduction() {
        let table = monthly_table();
        let calculator = TieredRateCalculator::new(&table);

        let result = calculator.evaluate(dec!(5000)).unwrap();

        assert_eq!(result.matched_band.rate, dec!(27.5));
        assert_eq!(result.computed_deduction, dec!(466.27));
        assert_eq!(result.net_amount, dec!(4533.73));
    }

    #[test]
    fn evaluate_echoes_base_amount() {
        let table = monthly_table();
        let calculator = TieredRateCalculator::new(&table);

        let result = calculator.evaluate(dec!(3000)).unwrap();

        assert_eq!(result.base_amount, dec!(3000));
    }

    // =========================================================================
    // band boundary tests
    // =========================================================================

    #[test]
    fn evaluate_at_upper_boundary_uses_lower_band() {
        let table = boundary_table();
        let calculator = TieredRateCalculator::new(&table);

        let result = calculator.evaluate(dec!(100)).unwrap();

        assert_eq!(result.matched_band.rate, dec!(10));
        assert_eq!(result.computed_deduction, dec!(5));
    }

    #[test]
    fn evaluate_one_cent_above_boundary_uses_upper_band() {
        let table = boundary_table();
        let calculator = TieredRateCalculator::new(&table);

        let result = calculator.evaluate(dec!(100.01)).unwrap();

        assert_eq!(result.matched_band.rate, dec!(20));
        // 100.01 × 20% − 15, exact: no rounding inside evaluate.
        assert_eq!(result.computed_deduction, dec!(5.002));
    }

    #[test]
    fn evaluate_at_zero_uses_first_band() {
        let table = monthly_table();
        let calculator = TieredRateCalculator::new(&table);

        let result = calculator.evaluate(dec!(0)).unwrap();

        assert!(result.is_exempt);
        assert_eq!(result.net_amount, dec!(0));
    }

    // =========================================================================
    // floor tests
    // =========================================================================

    #[test]
    fn evaluate_floors_negative_raw_deduction_to_zero() {
        let table = boundary_table();
        let calculator = TieredRateCalculator::new(&table);

        // 20 × 10% − 5 = −3, floored.
        let result = calculator.evaluate(dec!(20)).unwrap();

        assert_eq!(result.computed_deduction, dec!(0));
        assert_eq!(result.net_amount, dec!(20));
        assert!(result.is_exempt);
    }

    #[test]
    fn evaluate_never_produces_negative_deduction_or_net() {
        let table = monthly_table();
        let calculator = TieredRateCalculator::new(&table);

        for amount in [
            dec!(0),
            dec!(0.01),
            dec!(2428.80),
            dec!(2428.81),
            dec!(2826.65),
            dec!(2826.66),
            dec!(3751.05),
            dec!(3751.06),
            dec!(4664.68),
            dec!(4664.69),
            dec!(100000),
        ] {
            let result = calculator.evaluate(amount).unwrap();

            assert!(result.computed_deduction >= dec!(0), "amount {amount}");
            assert!(result.net_amount >= dec!(0), "amount {amount}");
        }
    }

    // =========================================================================
    // purity tests
    // =========================================================================

    #[test]
    fn evaluate_is_idempotent() {
        let table = monthly_table();
        let calculator = TieredRateCalculator::new(&table);

        let first = calculator.evaluate(dec!(3751.06)).unwrap();
        let second = calculator.evaluate(dec!(3751.06)).unwrap();

        assert_eq!(first, second);
    }

    // =========================================================================
    // error tests
    // =========================================================================

    #[test]
    fn evaluate_rejects_negative_amount() {
        let table = monthly_table();
        let calculator = TieredRateCalculator::new(&table);

        let result = calculator.evaluate(dec!(-1));

        assert_eq!(
            result,
            Err(EvaluationError::InvalidInput(
                InvalidInputError::NegativeAmount(dec!(-1))
            ))
        );
    }

    #[test]
    fn empty_table_is_rejected_at_construction() {
        let result = RateTable::new(vec![]);

        assert_eq!(result, Err(ConfigurationError::EmptyTable));
    }

    #[test]
    fn bounded_terminal_band_is_rejected_at_construction() {
        let result = RateTable::new(vec![band(
            dec!(0),
            Some(dec!(100)),
            dec!(10),
            dec!(0),
            "10%",
        )]);

        assert_eq!(result, Err(ConfigurationError::BoundedLastBand(dec!(100))));
    }
}
