//! Polars interop: series and aligned tables as DataFrames, plus Parquet I/O.
//!
//! Layout is one `date` column of dtype `Date` followed by one `Float64`
//! column per field.

use crate::data::AlignedTable;
use crate::domain::{Observation, Series, ValidationError};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DATE_COLUMN: &str = "date";

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing 'date' column")]
    MissingDate,

    #[error("null date at row {row}")]
    NullDate { row: usize },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// 1970-01-01, the origin of polars' `Date` day counts.
fn epoch() -> NaiveDate {
    NaiveDate::default()
}

impl Series {
    pub fn to_dataframe(&self) -> Result<DataFrame, FrameError> {
        let epoch = epoch();
        let days: Vec<i32> = self
            .dates()
            .map(|d| (d - epoch).num_days() as i32)
            .collect();
        let mut columns = Vec::with_capacity(self.fields().len() + 1);
        columns.push(Column::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?);
        for (i, field) in self.fields().iter().enumerate() {
            let values: Vec<Option<f64>> = self.observations().iter().map(|o| o.values[i]).collect();
            columns.push(Column::new(field.as_str().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Read a frame with a `date` column; every other column is cast to
    /// `Float64`. Rows may arrive in any order but dates must be unique.
    pub fn from_dataframe(df: &DataFrame) -> Result<Series, FrameError> {
        let dates = df
            .column(DATE_COLUMN)
            .map_err(|_| FrameError::MissingDate)?
            .cast(&DataType::Date)?;
        let date_ca = dates.date()?;

        let mut fields = Vec::new();
        let mut value_columns = Vec::new();
        for column in df.get_columns() {
            if column.name().as_str() == DATE_COLUMN {
                continue;
            }
            fields.push(column.name().to_string());
            value_columns.push(column.cast(&DataType::Float64)?);
        }
        let value_cas = value_columns
            .iter()
            .map(|c| c.f64())
            .collect::<Result<Vec<_>, _>>()?;

        let epoch = epoch();
        let mut observations = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let days = date_ca.get(row).ok_or(FrameError::NullDate { row })?;
            let date = epoch + chrono::Duration::days(days as i64);
            let values = value_cas.iter().map(|ca| ca.get(row)).collect();
            observations.push(Observation::new(date, values));
        }
        Ok(Series::from_unsorted(fields, observations)?)
    }

    pub fn write_parquet(&self, path: &Path) -> Result<(), FrameError> {
        let mut df = self.to_dataframe()?;
        let file = fs::File::create(path)?;
        ParquetWriter::new(file).finish(&mut df)?;
        Ok(())
    }

    pub fn read_parquet(path: &Path) -> Result<Series, FrameError> {
        let file = fs::File::open(path)?;
        let df = ParquetReader::new(file).finish()?;
        Series::from_dataframe(&df)
    }
}

impl AlignedTable {
    pub fn to_dataframe(&self) -> Result<DataFrame, FrameError> {
        self.series().to_dataframe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample() -> Series {
        Series::new(
            vec!["close".into(), "change".into()],
            vec![
                Observation::new(d(2), vec![Some(100.0), Some(0.5)]),
                Observation::new(d(3), vec![None, Some(-0.25)]),
                Observation::new(d(5), vec![Some(101.0), None]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn dataframe_layout() {
        let df = sample().to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("close").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("close").unwrap().null_count(), 1);
    }

    #[test]
    fn dataframe_roundtrip_preserves_nulls() {
        let series = sample();
        let back = Series::from_dataframe(&series.to_dataframe().unwrap()).unwrap();
        assert_eq!(series, back);
    }

    #[test]
    fn from_dataframe_requires_date_column() {
        let df = DataFrame::new(vec![Column::new("close".into(), vec![1.0f64])]).unwrap();
        assert!(matches!(
            Series::from_dataframe(&df),
            Err(FrameError::MissingDate)
        ));
    }
}
