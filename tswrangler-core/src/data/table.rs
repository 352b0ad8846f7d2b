//! AlignedTable — the result of combining named series over the date axis.

use crate::domain::Series;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Where an aligned column came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSource {
    /// Namespaced column name in the table.
    pub column: String,
    /// Name of the input series.
    pub series: String,
    /// Field name inside the input series.
    pub field: String,
}

/// Combined series. Absent source fields are nulls.
///
/// The table is itself a valid [`Series`], so it can be handed straight to a
/// gap analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedTable {
    table: Series,
    sources: Vec<ColumnSource>,
}

impl AlignedTable {
    pub(crate) fn new(table: Series, sources: Vec<ColumnSource>) -> Self {
        debug_assert_eq!(table.fields().len(), sources.len());
        Self { table, sources }
    }

    pub fn series(&self) -> &Series {
        &self.table
    }

    pub fn into_series(self) -> Series {
        self.table
    }

    pub fn columns(&self) -> &[String] {
        self.table.fields()
    }

    pub fn sources(&self) -> &[ColumnSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.table.dates()
    }

    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.table.span()
    }

    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.table.column(name)
    }

    /// Null count per column, in column order.
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.table.summary().null_counts
    }
}

/// Why an inner combination produced no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The collection held no series.
    NoInputs,
    /// The series share no date.
    NoCommonDates,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoInputs => write!(f, "no input series"),
            EmptyReason::NoCommonDates => write!(f, "no common dates across inputs"),
        }
    }
}

/// Outcome of an inner combination: rows, or an explained empty result.
#[derive(Debug, Clone, PartialEq)]
pub enum Intersection {
    Rows(AlignedTable),
    Empty(EmptyReason),
}

impl Intersection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Intersection::Empty(_))
    }

    pub fn table(&self) -> Option<&AlignedTable> {
        match self {
            Intersection::Rows(table) => Some(table),
            Intersection::Empty(_) => None,
        }
    }

    pub fn reason(&self) -> Option<EmptyReason> {
        match self {
            Intersection::Rows(_) => None,
            Intersection::Empty(reason) => Some(*reason),
        }
    }

    pub fn into_option(self) -> Option<AlignedTable> {
        match self {
            Intersection::Rows(table) => Some(table),
            Intersection::Empty(_) => None,
        }
    }
}
