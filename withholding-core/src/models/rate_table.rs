use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::RateBand;

/// Errors describing a malformed rate table.
///
/// Every variant is a configuration bug, never a transient condition: the
/// table is static data, so these are surfaced immediately and not retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The table has no bands at all.
    #[error("rate table is empty")]
    EmptyTable,

    /// The first band does not start at zero, so some non-negative amounts
    /// would match no band.
    #[error("first band must start at zero, got lower bound {0}")]
    FirstBandNotZero(Decimal),

    /// A band's upper bound is below its own lower bound.
    #[error("band {index} is inverted: upper bound {upper} < lower bound {lower}")]
    InvertedBand {
        index: usize,
        lower: Decimal,
        upper: Decimal,
    },

    /// A band other than the last has no upper bound.
    #[error("band {0} is unbounded but is not the last band")]
    UnboundedInnerBand(usize),

    /// The last band has a finite upper bound, so large amounts would match
    /// no band.
    #[error("last band must be unbounded, got upper bound {0}")]
    BoundedLastBand(Decimal),

    /// A band starts at or below the previous band's upper bound.
    #[error("band {index} overlaps the previous band: lower bound {lower} <= previous upper {previous_upper}")]
    OverlappingBands {
        index: usize,
        lower: Decimal,
        previous_upper: Decimal,
    },

    /// A band starts more than one cent above the previous band's upper
    /// bound, leaving amounts in between unmatched.
    #[error("gap before band {index}: lower bound {lower} is more than 0.01 above previous upper {previous_upper}")]
    GapBetweenBands {
        index: usize,
        lower: Decimal,
        previous_upper: Decimal,
    },

    /// A band's rate is outside the 0..=100 percent range.
    #[error("band {index} has rate {rate} outside 0..=100")]
    RateOutOfRange { index: usize, rate: Decimal },

    /// A band's subtract amount is negative.
    #[error("band {index} has negative subtract amount {subtract_amount}")]
    NegativeSubtractAmount {
        index: usize,
        subtract_amount: Decimal,
    },

    /// A band's subtract amount is smaller than the previous band's. The
    /// flat-rate method over-taxes lower portions more as the rate rises,
    /// so the correction must grow with the band index.
    #[error("band {index} has subtract amount {subtract_amount} below previous {previous}")]
    DecreasingSubtractAmount {
        index: usize,
        subtract_amount: Decimal,
        previous: Decimal,
    },

    /// No band matched the given amount. Unreachable for a validated table
    /// and a non-negative amount; reported rather than silently treated as
    /// an exemption.
    #[error("no band matched amount {0}")]
    NoMatchingBand(Decimal),
}

/// A validated, immutable withholding rate table.
///
/// Construction via [`RateTable::new`] enforces every structural invariant,
/// so any amount `>= 0` is guaranteed to match exactly one band. The table
/// is read-only configuration: load it once, share it freely.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use withholding_core::{RateBand, RateTable};
///
/// let table = RateTable::new(vec![
///     RateBand {
///         lower_bound: dec!(0),
///         upper_bound: Some(dec!(2428.80)),
///         rate: dec!(0),
///         subtract_amount: dec!(0),
///         label: "exempt".to_string(),
///     },
///     RateBand {
///         lower_bound: dec!(2428.81),
///         upper_bound: None,
///         rate: dec!(7.5),
///         subtract_amount: dec!(182.16),
///         label: "7.5%".to_string(),
///     },
/// ]).unwrap();
///
/// assert_eq!(table.bands().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RateBand>", into = "Vec<RateBand>")]
pub struct RateTable {
    bands: Vec<RateBand>,
}

// Contiguity convention: the next band starts at most one currency cent
// above the previous band's upper bound.
const MAX_BAND_STEP_SCALE: u32 = 2;

impl RateTable {
    /// Validates the given bands and builds a table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the bands are empty, do not start
    /// at zero, are not sorted/contiguous, are not terminated by a single
    /// unbounded band, or carry an out-of-range rate or subtract amount.
    pub fn new(bands: Vec<RateBand>) -> Result<Self, ConfigurationError> {
        if bands.is_empty() {
            return Err(ConfigurationError::EmptyTable);
        }

        let first = &bands[0];
        if first.lower_bound != Decimal::ZERO {
            return Err(ConfigurationError::FirstBandNotZero(first.lower_bound));
        }

        let one_cent = Decimal::new(1, MAX_BAND_STEP_SCALE);
        let last_index = bands.len() - 1;

        for (index, band) in bands.iter().enumerate() {
            match band.upper_bound {
                Some(upper) if upper < band.lower_bound => {
                    return Err(ConfigurationError::InvertedBand {
                        index,
                        lower: band.lower_bound,
                        upper,
                    });
                }
                Some(upper) if index == last_index => {
                    return Err(ConfigurationError::BoundedLastBand(upper));
                }
                None if index != last_index => {
                    return Err(ConfigurationError::UnboundedInnerBand(index));
                }
                _ => {}
            }

            if band.rate < Decimal::ZERO || band.rate > Decimal::ONE_HUNDRED {
                return Err(ConfigurationError::RateOutOfRange {
                    index,
                    rate: band.rate,
                });
            }

            if band.subtract_amount < Decimal::ZERO {
                return Err(ConfigurationError::NegativeSubtractAmount {
                    index,
                    subtract_amount: band.subtract_amount,
                });
            }

            if index == 0 {
                continue;
            }

            let previous = &bands[index - 1];
            // Inner bands all have finite upper bounds at this point.
            let previous_upper = previous.upper_bound.unwrap_or(Decimal::MAX);

            if band.lower_bound <= previous_upper {
                return Err(ConfigurationError::OverlappingBands {
                    index,
                    lower: band.lower_bound,
                    previous_upper,
                });
            }
            if band.lower_bound - previous_upper > one_cent {
                return Err(ConfigurationError::GapBetweenBands {
                    index,
                    lower: band.lower_bound,
                    previous_upper,
                });
            }

            if band.subtract_amount < previous.subtract_amount {
                return Err(ConfigurationError::DecreasingSubtractAmount {
                    index,
                    subtract_amount: band.subtract_amount,
                    previous: previous.subtract_amount,
                });
            }
        }

        Ok(Self { bands })
    }

    /// The bands in ascending order.
    pub fn bands(&self) -> &[RateBand] {
        &self.bands
    }

    /// Returns the first band containing `amount`. For a validated table
    /// and `amount >= 0` this always finds exactly one band.
    pub fn find_band(&self, amount: Decimal) -> Option<&RateBand> {
        self.bands.iter().find(|band| band.contains(amount))
    }
}

impl TryFrom<Vec<RateBand>> for RateTable {
    type Error = ConfigurationError;

    fn try_from(bands: Vec<RateBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<RateTable> for Vec<RateBand> {
    fn from(table: RateTable) -> Self {
        table.bands
    }
}
