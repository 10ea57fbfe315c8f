pub mod loader;
pub mod schedules;

pub use loader::{LoadedSchedule, RateBandRecord, RateTableLoader, RateTableLoaderError};
