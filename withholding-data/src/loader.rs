use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use withholding_core::{ConfigurationError, RateBand, RateTable};

/// Errors that can occur when loading rate table data.
#[derive(Debug, Error)]
pub enum RateTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("invalid table for schedule '{schedule}' year {year}: {source}")]
    InvalidTable {
        schedule: String,
        year: i32,
        source: ConfigurationError,
    },
}

impl From<csv::Error> for RateTableLoaderError {
    fn from(err: csv::Error) -> Self {
        RateTableLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a rate table CSV file.
///
/// One row per band, rows for a given `(schedule, year)` pair in band order:
/// - `schedule`: identifier for the table, e.g. a jurisdiction code
/// - `year`: the year the table applies to
/// - `lower_bound`: inclusive minimum amount for the band
/// - `upper_bound`: inclusive maximum amount (empty for unbounded)
/// - `rate`: percentage rate, e.g. `7.5`
/// - `subtract_amount`: fixed amount subtracted after applying the rate
/// - `label`: display description of the band
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RateBandRecord {
    pub schedule: String,
    pub year: i32,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub subtract_amount: Decimal,
    pub label: String,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl From<RateBandRecord> for RateBand {
    fn from(record: RateBandRecord) -> Self {
        RateBand {
            lower_bound: record.lower_bound,
            upper_bound: record.upper_bound,
            rate: record.rate,
            subtract_amount: record.subtract_amount,
            label: record.label,
        }
    }
}

/// A validated rate table together with the schedule it was loaded for.
#[derive(Debug, Clone)]
pub struct LoadedSchedule {
    pub schedule: String,
    pub year: i32,
    pub table: RateTable,
}

/// Loader for rate table data from CSV files.
///
/// Rate tables are static configuration that varies by jurisdiction and
/// year; loading them from CSV lets a table change without a code change.
/// Each `(schedule, year)` group of rows is validated as a whole before it
/// is handed out, so a loaded table is always usable as-is.
pub struct RateTableLoader;

impl RateTableLoader {
    /// Parse rate band records from a CSV reader.
    ///
    /// Returns the records in file order. The reader can be any type that
    /// implements `Read`, such as a file or a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RateBandRecord>, RateTableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: RateBandRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group parsed records by `(schedule, year)` and validate each group
    /// as a rate table.
    ///
    /// Groups are returned in first-appearance order; rows within a group
    /// keep their file order, which must be ascending band order.
    ///
    /// # Errors
    ///
    /// Returns [`RateTableLoaderError::InvalidTable`] naming the offending
    /// schedule and year if any group violates a table invariant.
    pub fn build_tables(
        records: Vec<RateBandRecord>,
    ) -> Result<Vec<LoadedSchedule>, RateTableLoaderError> {
        let mut groups: Vec<(String, i32, Vec<RateBand>)> = Vec::new();

        for record in records {
            let key = (record.schedule.clone(), record.year);
            match groups
                .iter_mut()
                .find(|(schedule, year, _)| *schedule == key.0 && *year == key.1)
            {
                Some((_, _, bands)) => bands.push(record.into()),
                None => groups.push((key.0, key.1, vec![record.into()])),
            }
        }

        groups
            .into_iter()
            .map(|(schedule, year, bands)| {
                let table = RateTable::new(bands).map_err(|source| {
                    RateTableLoaderError::InvalidTable {
                        schedule: schedule.clone(),
                        year,
                        source,
                    }
                })?;
                Ok(LoadedSchedule {
                    schedule,
                    year,
                    table,
                })
            })
            .collect()
    }
}
