//! CSV and Parquet loading into validated series.
//!
//! CSV exports are read with an explicit date format. A cell is either
//! empty (null) or a number, optionally with thousands separators and, in
//! percent columns, a trailing `%`. Anything else is an error naming the
//! line and column.

use crate::config::LoaderConfig;
use chrono::NaiveDate;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tswrangler_core::frame::FrameError;
use tswrangler_core::{Observation, Series, ValidationError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("date column '{column}' not found in header")]
    MissingDateColumn { column: String },

    #[error("line {line}: cannot parse date '{value}' with format '{format}'")]
    BadDate {
        line: usize,
        value: String,
        format: String,
    },

    #[error("line {line}, column '{column}': cannot parse '{value}' as a number")]
    BadValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Load by extension: `.parquet` through polars, anything else as CSV.
pub fn load_path(path: &Path, config: &LoaderConfig) -> Result<Series, LoadError> {
    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        return Ok(Series::read_parquet(path)?);
    }
    let file = std::fs::File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    load_csv(file, config)
}

pub fn load_csv<R: Read>(reader: R, config: &LoaderConfig) -> Result<Series, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let date_idx = headers
        .iter()
        .position(|h| h == config.date_column)
        .ok_or_else(|| LoadError::MissingDateColumn {
            column: config.date_column.clone(),
        })?;

    // (csv index, field name, percent column)
    let value_columns: Vec<(usize, String, bool)> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| {
            *i != date_idx && !config.skip_columns.iter().any(|s| s.as_str() == *h)
        })
        .map(|(i, h)| (i, h.to_string(), config.percent_columns.iter().any(|p| p == h)))
        .collect();
    let fields = value_columns.iter().map(|(_, name, _)| name.clone()).collect();

    let mut observations = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        // header is line 1
        let line = row + 2;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, &config.date_format).map_err(|_| {
            LoadError::BadDate {
                line,
                value: raw_date.to_string(),
                format: config.date_format.clone(),
            }
        })?;

        let mut values = Vec::with_capacity(value_columns.len());
        for (idx, name, percent) in &value_columns {
            let cell = record.get(*idx).unwrap_or_default();
            let value = parse_cell(cell, *percent).ok_or_else(|| LoadError::BadValue {
                line,
                column: name.clone(),
                value: cell.to_string(),
            })?;
            values.push(value);
        }
        observations.push(Observation::new(date, values));
    }

    tracing::debug!(rows = observations.len(), "parsed CSV records");
    Ok(Series::from_unsorted(fields, observations)?)
}

/// `Some(None)` for an empty cell, `None` when the cell is not a number.
fn parse_cell(cell: &str, percent: bool) -> Option<Option<f64>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(None);
    }
    let cell = if percent {
        cell.strip_suffix('%').unwrap_or(cell).trim_end()
    } else {
        cell
    };
    let cleaned: String = cell.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().map(Some)
}
