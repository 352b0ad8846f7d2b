//! TSWrangler Core — gap analysis and alignment for day-resolution time series.
//!
//! This crate contains:
//! - Calendar arithmetic with a single configurable weekend definition
//! - The validated date-indexed `Series` and its records
//! - `GapAnalyzer`: gap runs, ranking, missing-day reports, forward fill
//! - `SeriesAligner`: outer/inner combination of named series via merge sweep
//! - Content fingerprints and (feature `polars`) DataFrame/Parquet interop
//!
//! Nothing here logs or prints; diagnostics are returned as data.

pub mod calendar;
pub mod data;
pub mod domain;
pub mod fingerprint;
#[cfg(feature = "polars")]
pub mod frame;
pub mod gaps;

pub use calendar::{Calendar, CalendarError, Frequency, WeekendMask};
pub use data::{
    AlignError, AlignedTable, AlignmentWarning, EmptyReason, Intersection, NamedSeriesCollection,
    SeriesAligner,
};
pub use domain::{Observation, Series, SeriesSummary, ValidationError};
pub use fingerprint::DatasetHash;
pub use gaps::{GapAnalyzer, GapMode, GapRun, GapSummary, MissingDays, WeekdayCounts};
