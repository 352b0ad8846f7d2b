//! Calendar — pure day-resolution date arithmetic.
//!
//! A [`Calendar`] knows which weekdays are non-business days. Everything that
//! needs a "business day" answer (gap classification, missing-day reports,
//! business-day fill, weekend removal) goes through one calendar so the
//! weekend definition is applied uniformly.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All seven weekdays in Monday..Sunday order.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Errors from calendar operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Which dates a range or re-index should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Every calendar day.
    #[default]
    AllDays,
    /// Only days the calendar considers business days.
    BusinessDays,
}

/// Set of weekdays treated as weekend (non-business) days.
///
/// Stored as a 7-bit mask indexed by `Weekday::num_days_from_monday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekendMask(u8);

impl WeekendMask {
    /// Saturday and Sunday.
    pub const SATURDAY_SUNDAY: WeekendMask = WeekendMask(0b110_0000);

    /// No weekend at all; every day is a business day.
    pub const NONE: WeekendMask = WeekendMask(0);

    pub fn from_weekdays<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        let bits = days
            .into_iter()
            .fold(0u8, |acc, d| acc | (1 << d.num_days_from_monday()));
        WeekendMask(bits)
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    /// Weekend days in Monday..Sunday order.
    pub fn weekdays(&self) -> Vec<Weekday> {
        WEEKDAYS.into_iter().filter(|d| self.contains(*d)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for WeekendMask {
    fn default() -> Self {
        Self::SATURDAY_SUNDAY
    }
}

impl Serialize for WeekendMask {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names: Vec<String> = self.weekdays().iter().map(|d| d.to_string()).collect();
        names.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WeekendMask {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        let mut days = Vec::with_capacity(names.len());
        for name in names {
            let day = name
                .parse::<Weekday>()
                .map_err(|_| serde::de::Error::custom(format!("unknown weekday '{name}'")))?;
            days.push(day);
        }
        Ok(WeekendMask::from_weekdays(days))
    }
}

/// Business-day calendar at day resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Calendar {
    #[serde(default)]
    weekend: WeekendMask,
}

impl Calendar {
    pub fn new(weekend: WeekendMask) -> Self {
        Self { weekend }
    }

    pub fn weekend(&self) -> WeekendMask {
        self.weekend
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !self.weekend.contains(date.weekday())
    }

    /// Whether `date` belongs to a range of the given frequency.
    pub fn matches(&self, date: NaiveDate, frequency: Frequency) -> bool {
        match frequency {
            Frequency::AllDays => true,
            Frequency::BusinessDays => self.is_business_day(date),
        }
    }

    /// Every date in `[start, end]` that matches `frequency`, ascending.
    ///
    /// Endpoints are included when they satisfy the frequency. An all-weekend
    /// mask with `BusinessDays` yields an empty range.
    pub fn date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Frequency,
    ) -> Result<Vec<NaiveDate>, CalendarError> {
        if start > end {
            return Err(CalendarError::InvalidRange { start, end });
        }
        let span = (end - start).num_days() as usize + 1;
        let mut out = Vec::with_capacity(match frequency {
            Frequency::AllDays => span,
            Frequency::BusinessDays => span / 7 * (7 - self.weekend.len()) + 7,
        });
        let mut day = start;
        loop {
            if self.matches(day, frequency) {
                out.push(day);
            }
            if day == end {
                break;
            }
            day = match day.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(out)
    }

    /// Number of business days in `[start, end]` without building the range.
    pub fn business_days_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<usize, CalendarError> {
        if start > end {
            return Err(CalendarError::InvalidRange { start, end });
        }
        let span = (end - start).num_days() + 1;
        let full_weeks = span / 7;
        let mut count = full_weeks as usize * (7 - self.weekend.len());
        let offset = start.weekday().num_days_from_monday() as i64;
        for i in 0..(span % 7) {
            let day = WEEKDAYS[((offset + i) % 7) as usize];
            if !self.weekend.contains(day) {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Weekday of a date.
pub fn weekday_of(date: NaiveDate) -> Weekday {
    date.weekday()
}

/// Business day under the default Saturday/Sunday weekend.
pub fn is_business_day(date: NaiveDate) -> bool {
    Calendar::default().is_business_day(date)
}

/// [`Calendar::date_range`] on the default calendar.
pub fn date_range(
    start: NaiveDate,
    end: NaiveDate,
    frequency: Frequency,
) -> Result<Vec<NaiveDate>, CalendarError> {
    Calendar::default().date_range(start, end, frequency)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekday_of_known_dates() {
        assert_eq!(weekday_of(d(2022, 1, 1)), Weekday::Sat);
        assert_eq!(weekday_of(d(2022, 1, 2)), Weekday::Sun);
        assert_eq!(weekday_of(d(2022, 1, 3)), Weekday::Mon);
    }

    #[test]
    fn weekend_is_not_business() {
        assert!(!is_business_day(d(2022, 1, 1)));
        assert!(!is_business_day(d(2022, 1, 2)));
        assert!(is_business_day(d(2022, 1, 3)));
        assert!(is_business_day(d(2022, 1, 7)));
    }

    #[test]
    fn all_days_range_is_inclusive() {
        let range = date_range(d(2022, 1, 1), d(2022, 1, 10), Frequency::AllDays).unwrap();
        assert_eq!(range.len(), 10);
        assert_eq!(range[0], d(2022, 1, 1));
        assert_eq!(range[9], d(2022, 1, 10));
    }

    #[test]
    fn business_range_skips_weekend_endpoints() {
        // Sat 2022-01-01 .. Sun 2022-01-09
        let range = date_range(d(2022, 1, 1), d(2022, 1, 9), Frequency::BusinessDays).unwrap();
        assert_eq!(range.len(), 5);
        assert_eq!(range.first(), Some(&d(2022, 1, 3)));
        assert_eq!(range.last(), Some(&d(2022, 1, 7)));
    }

    #[test]
    fn single_day_range() {
        let range = date_range(d(2022, 1, 3), d(2022, 1, 3), Frequency::BusinessDays).unwrap();
        assert_eq!(range, vec![d(2022, 1, 3)]);
        let empty = date_range(d(2022, 1, 1), d(2022, 1, 1), Frequency::BusinessDays).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = date_range(d(2022, 1, 5), d(2022, 1, 1), Frequency::AllDays).unwrap_err();
        assert_eq!(
            err,
            CalendarError::InvalidRange {
                start: d(2022, 1, 5),
                end: d(2022, 1, 1)
            }
        );
    }

    #[test]
    fn business_day_count_matches_range() {
        let cal = Calendar::default();
        for (s, e) in [
            (d(2022, 1, 1), d(2022, 1, 1)),
            (d(2022, 1, 1), d(2022, 1, 31)),
            (d(2021, 12, 29), d(2022, 3, 4)),
            (d(2024, 2, 26), d(2024, 3, 3)),
        ] {
            let expected = cal.date_range(s, e, Frequency::BusinessDays).unwrap().len();
            assert_eq!(cal.business_days_between(s, e).unwrap(), expected);
        }
    }

    #[test]
    fn custom_weekend_applies() {
        let cal = Calendar::new(WeekendMask::from_weekdays([Weekday::Fri, Weekday::Sat]));
        assert!(!cal.is_business_day(d(2022, 1, 7)));
        assert!(cal.is_business_day(d(2022, 1, 9)));
    }

    #[test]
    fn weekend_mask_serde_uses_weekday_names() {
        let json = serde_json::to_string(&WeekendMask::default()).unwrap();
        assert_eq!(json, r#"["Sat","Sun"]"#);
        let parsed: WeekendMask = serde_json::from_str(r#"["Sunday","Monday"]"#).unwrap();
        assert!(parsed.contains(Weekday::Sun));
        assert!(parsed.contains(Weekday::Mon));
        assert_eq!(parsed.len(), 2);
        assert!(serde_json::from_str::<WeekendMask>(r#"["Caturday"]"#).is_err());
    }
}
