//! Gap analysis for a single series.
//!
//! A gap is a maximal run of dates missing between two consecutive
//! observations. Runs are classified day by day against a [`Calendar`] so each
//! one has both an all-days and a business-days view.
//!
//! [`Calendar`]: crate::calendar::Calendar

pub mod analyzer;
pub mod run;

pub use analyzer::{GapAnalyzer, GapSummary, MissingDays, WeekdayCounts};
pub use run::{GapMode, GapRun};
