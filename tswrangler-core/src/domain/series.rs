//! Series — an ordered, duplicate-free, date-keyed sequence of records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Why a set of observations is not a valid series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("dates are not ascending at row {index}: {date} follows {previous}")]
    Unsorted {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("duplicate date {date}")]
    DuplicateDate { date: NaiveDate },

    #[error("record for {date} has {actual} values, expected {expected}")]
    RowWidth {
        date: NaiveDate,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate field name '{field}'")]
    DuplicateField { field: String },

    #[error("field names must not be empty")]
    EmptyFieldName,
}

/// One record of a series: a date and one optional value per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

impl Observation {
    pub fn new(date: NaiveDate, values: Vec<Option<f64>>) -> Self {
        Self { date, values }
    }

    /// A record with every field null.
    pub fn null(date: NaiveDate, width: usize) -> Self {
        Self {
            date,
            values: vec![None; width],
        }
    }

    pub fn is_all_null(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// Validated date-indexed series.
///
/// Invariants, checked at construction and on deserialization:
/// - dates are strictly ascending (sorted, no duplicates)
/// - every record has exactly one value slot per field
/// - field names are non-empty and unique
///
/// A `Series` is never mutated after construction; transformations return
/// new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesRepr", into = "SeriesRepr")]
pub struct Series {
    fields: Vec<String>,
    observations: Vec<Observation>,
}

#[derive(Serialize, Deserialize)]
struct SeriesRepr {
    fields: Vec<String>,
    observations: Vec<Observation>,
}

impl TryFrom<SeriesRepr> for Series {
    type Error = ValidationError;

    fn try_from(repr: SeriesRepr) -> Result<Self, Self::Error> {
        Series::new(repr.fields, repr.observations)
    }
}

impl From<Series> for SeriesRepr {
    fn from(series: Series) -> Self {
        SeriesRepr {
            fields: series.fields,
            observations: series.observations,
        }
    }
}

impl Series {
    /// Build a series from observations that are already in ascending order.
    pub fn new(
        fields: Vec<String>,
        observations: Vec<Observation>,
    ) -> Result<Self, ValidationError> {
        let series = Self {
            fields,
            observations,
        };
        series.validate()?;
        Ok(series)
    }

    /// Build a series from observations in any order.
    ///
    /// Sorting is stable; duplicate dates are still rejected rather than
    /// silently collapsed.
    pub fn from_unsorted(
        fields: Vec<String>,
        mut observations: Vec<Observation>,
    ) -> Result<Self, ValidationError> {
        observations.sort_by_key(|o| o.date);
        Self::new(fields, observations)
    }

    /// A series with the given fields and no records.
    pub fn empty(fields: Vec<String>) -> Result<Self, ValidationError> {
        Self::new(fields, Vec::new())
    }

    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.is_empty() {
                return Err(ValidationError::EmptyFieldName);
            }
            if !seen.insert(field.as_str()) {
                return Err(ValidationError::DuplicateField {
                    field: field.clone(),
                });
            }
        }

        let width = self.fields.len();
        for (i, obs) in self.observations.iter().enumerate() {
            if obs.values.len() != width {
                return Err(ValidationError::RowWidth {
                    date: obs.date,
                    expected: width,
                    actual: obs.values.len(),
                });
            }
            if i > 0 {
                let previous = self.observations[i - 1].date;
                if obs.date == previous {
                    return Err(ValidationError::DuplicateDate { date: obs.date });
                }
                if obs.date < previous {
                    return Err(ValidationError::Unsorted {
                        index: i,
                        previous,
                        date: obs.date,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.observations.iter().map(|o| o.date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// `(first, last)` date, or `None` for an empty series.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.first_date()?, self.last_date()?))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.get(date).is_some()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Observation> {
        self.observations
            .binary_search_by_key(&date, |o| o.date)
            .ok()
            .map(|i| &self.observations[i])
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    /// All values of one field, in date order.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.field_index(name)?;
        Some(self.observations.iter().map(|o| o.values[idx]).collect())
    }

    /// Keep only records whose date satisfies `keep`.
    pub fn filter_dates<F>(&self, mut keep: F) -> Series
    where
        F: FnMut(NaiveDate) -> bool,
    {
        Series {
            fields: self.fields.clone(),
            observations: self
                .observations
                .iter()
                .filter(|o| keep(o.date))
                .cloned()
                .collect(),
        }
    }

    /// Same records under new field names. Callers keep names unique.
    pub(crate) fn with_fields(&self, fields: Vec<String>) -> Series {
        debug_assert_eq!(fields.len(), self.fields.len());
        Series {
            fields,
            observations: self.observations.clone(),
        }
    }

    /// Assemble from parts already known to satisfy the invariants.
    pub(crate) fn from_parts_unchecked(
        fields: Vec<String>,
        observations: Vec<Observation>,
    ) -> Series {
        let series = Series {
            fields,
            observations,
        };
        debug_assert!(series.validate().is_ok());
        series
    }

    /// Span, record count and per-field null counts.
    pub fn summary(&self) -> SeriesSummary {
        let null_counts = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let nulls = self
                    .observations
                    .iter()
                    .filter(|o| o.values[i].is_none())
                    .count();
                (name.clone(), nulls)
            })
            .collect();
        SeriesSummary {
            first: self.first_date(),
            last: self.last_date(),
            count: self.len(),
            null_counts,
        }
    }
}

/// Descriptive context for a series: span, size and nulls per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
    pub count: usize,
    pub null_counts: Vec<(String, usize)>,
}
