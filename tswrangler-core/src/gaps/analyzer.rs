//! GapAnalyzer — gap detection, ranking, missing-day reports and fill.

use super::run::{GapMode, GapRun};
use crate::calendar::{Calendar, CalendarError, Frequency, WEEKDAYS};
use crate::domain::{Observation, Series, ValidationError};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::ser::SerializeMap;
use serde::Serialize;

/// Read-only analysis over one borrowed series.
///
/// All business-day answers come from the analyzer's single [`Calendar`].
#[derive(Debug, Clone, Copy)]
pub struct GapAnalyzer<'a> {
    series: &'a Series,
    calendar: Calendar,
}

impl<'a> GapAnalyzer<'a> {
    /// Analyzer on the default Saturday/Sunday calendar.
    pub fn new(series: &'a Series) -> Result<Self, ValidationError> {
        Self::with_calendar(series, Calendar::default())
    }

    pub fn with_calendar(series: &'a Series, calendar: Calendar) -> Result<Self, ValidationError> {
        series.validate()?;
        Ok(Self { series, calendar })
    }

    pub fn series(&self) -> &'a Series {
        self.series
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Every gap run, in series order. Fewer than two points means no gaps.
    pub fn find_gaps(&self) -> Vec<GapRun> {
        self.series
            .observations()
            .windows(2)
            .filter_map(|pair| self.gap_between(pair[0].date, pair[1].date))
            .collect()
    }

    fn gap_between(&self, previous: NaiveDate, anchor: NaiveDate) -> Option<GapRun> {
        let diff = (anchor - previous).num_days();
        if diff <= 1 {
            return None;
        }
        let days: Vec<NaiveDate> = (1..diff as u64)
            .filter_map(|i| previous.checked_add_days(Days::new(i)))
            .collect();
        let business_days = days
            .iter()
            .copied()
            .filter(|d| self.calendar.is_business_day(*d))
            .collect();
        Some(GapRun {
            previous,
            anchor,
            days,
            business_days,
        })
    }

    /// The `k` longest runs under `mode`, longest first.
    ///
    /// Ties keep series order. Asking for more runs than exist returns all of
    /// them; `k == 0` returns none.
    pub fn biggest_gaps(&self, mode: GapMode, k: usize) -> Vec<GapRun> {
        let mut runs = self.find_gaps();
        runs.sort_by(|a, b| b.count(mode).cmp(&a.count(mode)));
        runs.truncate(k);
        runs
    }

    /// Dates expected at `frequency` within the series' own span that have no
    /// observation.
    pub fn report_missing_days(&self, frequency: Frequency) -> MissingDays {
        let Some(expected) = self.expected_slots(frequency) else {
            return MissingDays::new(frequency, Vec::new());
        };
        let observed = self.series.observations();
        let mut missing = Vec::new();
        let mut j = 0;
        for slot in expected {
            while j < observed.len() && observed[j].date < slot {
                j += 1;
            }
            if j >= observed.len() || observed[j].date != slot {
                missing.push(slot);
            }
        }
        MissingDays::new(frequency, missing)
    }

    /// Re-index onto every `frequency` slot of the series' own span, carrying
    /// the last known record forward into empty slots.
    pub fn fill_forward(&self, frequency: Frequency) -> Series {
        match self.expected_slots(frequency) {
            Some(slots) => self.reindex(&slots),
            None => self.reindex(&[]),
        }
    }

    /// Like [`fill_forward`](Self::fill_forward) over an explicit range.
    ///
    /// Slots before the first observation have no prior value and become
    /// all-null records.
    pub fn fill_forward_within(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Frequency,
    ) -> Result<Series, CalendarError> {
        let slots = self.calendar.date_range(start, end, frequency)?;
        Ok(self.reindex(&slots))
    }

    /// Drop every record that falls on a weekend day.
    pub fn remove_weekends(&self) -> Series {
        self.series
            .filter_dates(|date| self.calendar.is_business_day(date))
    }

    /// Aggregate view of the series' gaps.
    pub fn gap_summary(&self) -> GapSummary {
        let runs = self.find_gaps();
        let missing_days: usize = runs.iter().map(GapRun::calendar_days).sum();
        let missing_business_days: usize = runs.iter().map(GapRun::business_day_count).sum();
        let longest = runs.iter().map(GapRun::calendar_days).max();
        let coverage = self.series.span().map(|(first, last)| {
            let expected = (last - first).num_days() as f64 + 1.0;
            self.series.len() as f64 / expected
        });
        GapSummary {
            runs: runs.len(),
            missing_days,
            missing_business_days,
            longest,
            coverage,
        }
    }

    fn expected_slots(&self, frequency: Frequency) -> Option<Vec<NaiveDate>> {
        let (first, last) = self.series.span()?;
        self.calendar.date_range(first, last, frequency).ok()
    }

    fn reindex(&self, slots: &[NaiveDate]) -> Series {
        let observed = self.series.observations();
        let width = self.series.fields().len();
        let mut out = Vec::with_capacity(slots.len());
        let mut last: Option<&Observation> = None;
        let mut j = 0;
        for &slot in slots {
            while j < observed.len() && observed[j].date <= slot {
                last = Some(&observed[j]);
                j += 1;
            }
            out.push(match last {
                Some(obs) => Observation::new(slot, obs.values.clone()),
                None => Observation::null(slot, width),
            });
        }
        Series::from_parts_unchecked(self.series.fields().to_vec(), out)
    }
}

/// Totals across every gap run of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapSummary {
    pub runs: usize,
    pub missing_days: usize,
    pub missing_business_days: usize,
    pub longest: Option<usize>,
    /// Observed records over calendar days in the span; `None` when empty.
    pub coverage: Option<f64>,
}

/// Dates missing from a series at a given frequency.
///
/// An empty report is a normal outcome, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDays {
    pub frequency: Frequency,
    pub dates: Vec<NaiveDate>,
}

impl MissingDays {
    fn new(frequency: Frequency, dates: Vec<NaiveDate>) -> Self {
        Self { frequency, dates }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn by_weekday(&self) -> WeekdayCounts {
        WeekdayCounts::from_dates(&self.dates)
    }

    pub fn into_dates(self) -> Vec<NaiveDate> {
        self.dates
    }
}

/// Date counts per weekday, Monday..Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekdayCounts([usize; 7]);

impl WeekdayCounts {
    pub fn from_dates(dates: &[NaiveDate]) -> Self {
        let mut counts = [0usize; 7];
        for date in dates {
            counts[date.weekday().num_days_from_monday() as usize] += 1;
        }
        WeekdayCounts(counts)
    }

    pub fn get(&self, day: Weekday) -> usize {
        self.0[day.num_days_from_monday() as usize]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// `(weekday, count)` pairs for weekdays with a non-zero count.
    pub fn non_zero(&self) -> impl Iterator<Item = (Weekday, usize)> + '_ {
        self.iter().filter(|(_, n)| *n > 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, usize)> + '_ {
        WEEKDAYS.iter().map(move |d| (*d, self.get(*d)))
    }
}

impl Serialize for WeekdayCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        for (day, count) in self.iter() {
            map.serialize_entry(&day.to_string(), &count)?;
        }
        map.end()
    }
}
