//! Multi-series time alignment.
//!
//! Given a collection of named series, combine them on a common date axis
//! with outer (union) or inner (intersection) semantics. Both combinations
//! are a single merge sweep over the already-sorted inputs, so cost grows
//! with total record count rather than with the number of pairwise joins.

use super::collection::NamedSeriesCollection;
use super::table::{AlignedTable, ColumnSource, EmptyReason, Intersection};
use crate::domain::{Observation, Series, SeriesSummary, ValidationError};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use thiserror::Error;

/// Errors raised while assembling series for alignment.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("series '{series}' is not a valid date-indexed series: {source}")]
    Validation {
        series: String,
        source: ValidationError,
    },

    #[error("series name must not be empty")]
    EmptyName,

    #[error("series '{name}' was added more than once")]
    DuplicateName { name: String },

    #[error("column '{column}' is produced by both '{first}' and '{second}'")]
    ColumnCollision {
        column: String,
        first: String,
        second: String,
    },
}

/// Non-fatal observations about the inputs, returned for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentWarning {
    /// The series has no records; it contributes only nulls to a union and
    /// empties any intersection.
    EmptySeries { series: String },
    /// The series' date span overlaps no other series' span.
    DisjointSpan { series: String },
}

/// Combines a [`NamedSeriesCollection`] over the date axis.
#[derive(Debug, Clone)]
pub struct SeriesAligner {
    collection: NamedSeriesCollection,
    sources: Vec<ColumnSource>,
    /// First column index of each series in the combined row.
    offsets: Vec<usize>,
    width: usize,
}

impl SeriesAligner {
    /// Validate every input and lay out the combined columns.
    pub fn new(collection: NamedSeriesCollection) -> Result<Self, AlignError> {
        let mut sources = Vec::new();
        let mut offsets = Vec::with_capacity(collection.len());
        for (name, series) in collection.iter() {
            series.validate().map_err(|source| AlignError::Validation {
                series: name.to_string(),
                source,
            })?;
            offsets.push(sources.len());
            let suffix = format!("_{name}");
            for column in series.fields() {
                let field = column.strip_suffix(&suffix).unwrap_or(column);
                sources.push(ColumnSource {
                    column: column.clone(),
                    series: name.to_string(),
                    field: field.to_string(),
                });
            }
        }
        let width = sources.len();
        Ok(Self {
            collection,
            sources,
            offsets,
            width,
        })
    }

    pub fn collection(&self) -> &NamedSeriesCollection {
        &self.collection
    }

    /// Combined column names in input-series order, then field order.
    pub fn columns(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.column.clone()).collect()
    }

    /// Outer combination: every date present in any input.
    pub fn union(&self) -> AlignedTable {
        let inputs: Vec<&Series> = self.collection.iter().map(|(_, s)| s).collect();
        let mut cursors = vec![0usize; inputs.len()];
        let mut heap = BinaryHeap::with_capacity(inputs.len());
        for (i, series) in inputs.iter().enumerate() {
            if let Some(first) = series.observations().first() {
                heap.push(Reverse((first.date, i)));
            }
        }

        let total: usize = inputs.iter().map(|s| s.len()).sum();
        let mut rows = Vec::with_capacity(total);
        while let Some(&Reverse((date, _))) = heap.peek() {
            let mut row = Observation::null(date, self.width);
            while let Some(&Reverse((next, i))) = heap.peek() {
                if next != date {
                    break;
                }
                heap.pop();
                let observations = inputs[i].observations();
                self.place(&mut row, i, &observations[cursors[i]]);
                cursors[i] += 1;
                if let Some(following) = observations.get(cursors[i]) {
                    heap.push(Reverse((following.date, i)));
                }
            }
            rows.push(row);
        }

        AlignedTable::new(
            Series::from_parts_unchecked(self.columns(), rows),
            self.sources.clone(),
        )
    }

    /// Inner combination: only dates present in every input.
    pub fn intersection(&self) -> Intersection {
        let inputs: Vec<&Series> = self.collection.iter().map(|(_, s)| s).collect();
        if inputs.is_empty() {
            return Intersection::Empty(EmptyReason::NoInputs);
        }

        let mut cursors = vec![0usize; inputs.len()];
        let mut rows = Vec::new();
        'sweep: loop {
            let mut target = NaiveDate::MIN;
            for (series, &cursor) in inputs.iter().zip(&cursors) {
                match series.observations().get(cursor) {
                    Some(obs) => target = target.max(obs.date),
                    None => break 'sweep,
                }
            }

            let mut aligned = true;
            for (i, series) in inputs.iter().enumerate() {
                let observations = series.observations();
                while cursors[i] < observations.len() && observations[cursors[i]].date < target {
                    cursors[i] += 1;
                }
                match observations.get(cursors[i]) {
                    None => break 'sweep,
                    Some(obs) if obs.date != target => aligned = false,
                    Some(_) => {}
                }
            }

            if aligned {
                let mut row = Observation::null(target, self.width);
                for (i, series) in inputs.iter().enumerate() {
                    self.place(&mut row, i, &series.observations()[cursors[i]]);
                    cursors[i] += 1;
                }
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return Intersection::Empty(EmptyReason::NoCommonDates);
        }
        Intersection::Rows(AlignedTable::new(
            Series::from_parts_unchecked(self.columns(), rows),
            self.sources.clone(),
        ))
    }

    /// Span, record count and nulls for each input, in input order.
    pub fn diagnostics(&self) -> IndexMap<String, SeriesSummary> {
        self.collection
            .iter()
            .map(|(name, series)| (name.to_string(), series.summary()))
            .collect()
    }

    pub fn warnings(&self) -> Vec<AlignmentWarning> {
        let spans: Vec<(&str, Option<(NaiveDate, NaiveDate)>)> = self
            .collection
            .iter()
            .map(|(name, series)| (name, series.span()))
            .collect();

        let mut warnings = Vec::new();
        for (i, (name, span)) in spans.iter().enumerate() {
            let Some((first, last)) = span else {
                warnings.push(AlignmentWarning::EmptySeries {
                    series: name.to_string(),
                });
                continue;
            };
            let others: Vec<(NaiveDate, NaiveDate)> = spans
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .filter_map(|(_, (_, s))| *s)
                .collect();
            let overlaps = others.iter().any(|(f, l)| f <= last && first <= l);
            if !others.is_empty() && !overlaps {
                warnings.push(AlignmentWarning::DisjointSpan {
                    series: name.to_string(),
                });
            }
        }
        warnings
    }

    fn place(&self, row: &mut Observation, input: usize, obs: &Observation) {
        let start = self.offsets[input];
        row.values[start..start + obs.values.len()].copy_from_slice(&obs.values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, m, day).unwrap()
    }

    fn series(fields: &[&str], rows: &[(NaiveDate, f64)]) -> Series {
        Series::new(
            fields.iter().map(|f| f.to_string()).collect(),
            rows.iter()
                .map(|(date, v)| Observation::new(*date, vec![Some(*v); fields.len()]))
                .collect(),
        )
        .unwrap()
    }

    fn aligner(pairs: Vec<(&str, Series)>) -> SeriesAligner {
        SeriesAligner::new(NamedSeriesCollection::from_pairs(pairs).unwrap()).unwrap()
    }

    fn two_overlapping() -> SeriesAligner {
        aligner(vec![
            ("A", series(&["value"], &[(d(1, 1), 1.0), (d(1, 2), 2.0), (d(1, 3), 3.0)])),
            ("B", series(&["value"], &[(d(1, 2), 20.0), (d(1, 3), 30.0), (d(1, 4), 40.0)])),
        ])
    }

    #[test]
    fn union_covers_all_dates_with_nulls() {
        let table = two_overlapping().union();
        let dates: Vec<_> = table.dates().collect();
        assert_eq!(dates, vec![d(1, 1), d(1, 2), d(1, 3), d(1, 4)]);
        assert_eq!(table.columns(), ["value_A", "value_B"]);
        assert_eq!(
            table.column("value_A").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0), None]
        );
        assert_eq!(
            table.column("value_B").unwrap(),
            vec![None, Some(20.0), Some(30.0), Some(40.0)]
        );
        assert_eq!(
            table.null_counts(),
            vec![("value_A".to_string(), 1), ("value_B".to_string(), 1)]
        );
    }

    #[test]
    fn intersection_keeps_common_dates() {
        let result = two_overlapping().intersection();
        let table = result.table().unwrap();
        let dates: Vec<_> = table.dates().collect();
        assert_eq!(dates, vec![d(1, 2), d(1, 3)]);
        assert_eq!(table.column("value_A").unwrap(), vec![Some(2.0), Some(3.0)]);
        assert_eq!(table.column("value_B").unwrap(), vec![Some(20.0), Some(30.0)]);
    }

    #[test]
    fn intersection_empty_reports_reason() {
        let a = aligner(vec![
            ("A", series(&["v"], &[(d(1, 1), 1.0)])),
            ("B", series(&["v"], &[(d(1, 2), 2.0)])),
        ]);
        let result = a.intersection();
        assert!(result.is_empty());
        assert_eq!(result.reason(), Some(EmptyReason::NoCommonDates));
        assert_eq!(
            result.reason().unwrap().to_string(),
            "no common dates across inputs"
        );

        let none = SeriesAligner::new(NamedSeriesCollection::new()).unwrap();
        assert_eq!(none.intersection().reason(), Some(EmptyReason::NoInputs));
        assert!(none.union().is_empty());
    }

    #[test]
    fn columns_follow_input_then_field_order() {
        let a = aligner(vec![
            ("z", series(&["open", "close"], &[(d(1, 1), 1.0)])),
            ("a", series(&["close"], &[(d(1, 1), 2.0)])),
        ]);
        assert_eq!(a.columns(), vec!["open_z", "close_z", "close_a"]);
        let sources = a.union().sources().to_vec();
        assert_eq!(sources[1].series, "z");
        assert_eq!(sources[1].field, "close");
        assert_eq!(sources[2].series, "a");
    }

    #[test]
    fn three_way_sweep() {
        let a = aligner(vec![
            ("A", series(&["v"], &[(d(1, 1), 1.0), (d(1, 3), 3.0), (d(1, 5), 5.0), (d(1, 7), 7.0)])),
            ("B", series(&["v"], &[(d(1, 3), 3.0), (d(1, 4), 4.0), (d(1, 5), 5.0)])),
            ("C", series(&["v"], &[(d(1, 2), 2.0), (d(1, 3), 3.0), (d(1, 5), 5.0), (d(1, 9), 9.0)])),
        ]);
        let inner: Vec<_> = a.intersection().into_option().unwrap().dates().collect();
        assert_eq!(inner, vec![d(1, 3), d(1, 5)]);
        let outer: Vec<_> = a.union().dates().collect();
        assert_eq!(
            outer,
            vec![d(1, 1), d(1, 2), d(1, 3), d(1, 4), d(1, 5), d(1, 7), d(1, 9)]
        );
    }

    #[test]
    fn diagnostics_per_input() {
        let diag = two_overlapping().diagnostics();
        assert_eq!(diag.len(), 2);
        assert_eq!(diag["A"].first, Some(d(1, 1)));
        assert_eq!(diag["B"].last, Some(d(1, 4)));
        assert_eq!(diag["B"].count, 3);
    }

    #[test]
    fn warnings_flag_empty_and_disjoint() {
        let a = aligner(vec![
            ("A", series(&["v"], &[(d(1, 1), 1.0), (d(1, 10), 1.0)])),
            ("B", series(&["v"], &[(d(1, 5), 1.0)])),
            ("C", series(&["v"], &[(d(3, 1), 1.0)])),
            ("D", Series::empty(vec!["v".into()]).unwrap()),
        ]);
        assert_eq!(
            a.warnings(),
            vec![
                AlignmentWarning::DisjointSpan { series: "C".into() },
                AlignmentWarning::EmptySeries { series: "D".into() },
            ]
        );
        assert_eq!(a.intersection().reason(), Some(EmptyReason::NoCommonDates));
    }
}
