//! Bundled withholding schedules.
//!
//! The tables here are the single source of truth for schedules the tools
//! ship with; anything else comes in through the CSV loader.

use rust_decimal_macros::dec;
use withholding_core::{RateBand, RateTable};

/// Brazilian monthly income-tax withholding table (IRRF), May 2023 edition,
/// still in force for 2024 filings.
///
/// Five bands; the lowest is fully exempt and the last is unbounded.
pub fn brazil_irrf_monthly_2024() -> RateTable {
    RateTable::new(vec![
        RateBand {
            lower_bound: dec!(0),
            upper_bound: Some(dec!(2428.80)),
            rate: dec!(0),
            subtract_amount: dec!(0),
            label: "exempt".to_string(),
        },
        RateBand {
            lower_bound: dec!(2428.81),
            upper_bound: Some(dec!(2826.65)),
            rate: dec!(7.5),
            subtract_amount: dec!(182.16),
            label: "7.5%".to_string(),
        },
        RateBand {
            lower_bound: dec!(2826.66),
            upper_bound: Some(dec!(3751.05)),
            rate: dec!(15),
            subtract_amount: dec!(394.16),
            label: "15%".to_string(),
        },
        RateBand {
            lower_bound: dec!(3751.06),
            upper_bound: Some(dec!(4664.68)),
            rate: dec!(22.5),
            subtract_amount: dec!(675.49),
            label: "22.5%".to_string(),
        },
        RateBand {
            lower_bound: dec!(4664.69),
            upper_bound: None,
            rate: dec!(27.5),
            subtract_amount: dec!(908.73),
            label: "27.5%".to_string(),
        },
    ])
    .expect("bundled IRRF table satisfies every table invariant")
}
