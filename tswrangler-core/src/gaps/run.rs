//! GapRun — one maximal run of missing dates.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Which view of a gap run to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GapMode {
    /// Every missing calendar day counts.
    #[default]
    AllDays,
    /// Only missing business days count.
    BusinessOnly,
}

/// A maximal run of consecutive missing dates strictly between two
/// consecutive observations.
///
/// Computed, read-only view; recompute it from the series instead of editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapRun {
    /// Last observed date before the gap.
    pub previous: NaiveDate,
    /// First observed date after the gap.
    pub anchor: NaiveDate,
    /// Every missing date, ascending.
    pub days: Vec<NaiveDate>,
    /// The missing dates that are business days, ascending.
    pub business_days: Vec<NaiveDate>,
}

impl GapRun {
    /// Number of missing calendar days.
    pub fn calendar_days(&self) -> usize {
        self.days.len()
    }

    /// Number of missing business days.
    pub fn business_day_count(&self) -> usize {
        self.business_days.len()
    }

    pub fn count(&self, mode: GapMode) -> usize {
        self.days_for(mode).len()
    }

    pub fn days_for(&self, mode: GapMode) -> &[NaiveDate] {
        match mode {
            GapMode::AllDays => &self.days,
            GapMode::BusinessOnly => &self.business_days,
        }
    }

    pub fn weekdays(&self) -> Vec<Weekday> {
        self.days.iter().map(|d| d.weekday()).collect()
    }

    pub fn business_weekdays(&self) -> Vec<Weekday> {
        self.business_days.iter().map(|d| d.weekday()).collect()
    }

    pub fn first_missing(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn last_missing(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }
}
