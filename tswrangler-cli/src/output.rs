//! Writing series to disk. The format follows the file extension.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tswrangler_core::Series;

pub const DATE_HEADER: &str = "Date";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Parquet,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            Some("parquet") => Ok(Self::Parquet),
            _ => bail!(
                "cannot infer output format from {} (use .csv, .json or .parquet)",
                path.display()
            ),
        }
    }
}

pub fn write_series(series: &Series, path: &Path) -> Result<()> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Csv => {
            let file =
                File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            write_csv(series, file)?;
        }
        OutputFormat::Json => {
            let file =
                File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, series)?;
            writer.flush()?;
        }
        OutputFormat::Parquet => series
            .write_parquet(path)
            .with_context(|| format!("failed to write {}", path.display()))?,
    }
    tracing::info!(path = %path.display(), rows = series.len(), "wrote series");
    Ok(())
}

/// ISO dates; nulls are empty cells.
pub fn write_csv<W: Write>(series: &Series, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = Vec::with_capacity(series.fields().len() + 1);
    header.push(DATE_HEADER);
    header.extend(series.fields().iter().map(String::as_str));
    wtr.write_record(&header)?;

    for obs in series.observations() {
        let mut row = Vec::with_capacity(obs.values.len() + 1);
        row.push(obs.date.format(DATE_FORMAT).to_string());
        row.extend(
            obs.values
                .iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;
    use crate::loader::load_path;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use tswrangler_core::Observation;

    fn sample() -> Series {
        let d = |day| NaiveDate::from_ymd_opt(2022, 1, day).unwrap();
        Series::new(
            vec!["Price".into(), "Change %".into()],
            vec![
                Observation::new(d(3), vec![Some(1230.0), None]),
                Observation::new(d(5), vec![Some(1234.5), Some(-0.35)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            OutputFormat::from_path(&PathBuf::from("a.CSV")).unwrap(),
            OutputFormat::Csv
        );
        assert_eq!(
            OutputFormat::from_path(&PathBuf::from("a.parquet")).unwrap(),
            OutputFormat::Parquet
        );
        assert!(OutputFormat::from_path(&PathBuf::from("a.xlsx")).is_err());
        assert!(OutputFormat::from_path(&PathBuf::from("a")).is_err());
    }

    #[test]
    fn csv_layout() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Price,Change %");
        assert_eq!(lines[1], "2022-01-03,1230,");
        assert_eq!(lines[2], "2022-01-05,1234.5,-0.35");
    }

    #[test]
    fn csv_output_loads_back_with_iso_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_series(&sample(), &path).unwrap();
        let config = LoaderConfig {
            date_format: "%Y-%m-%d".into(),
            percent_columns: Vec::new(),
            ..LoaderConfig::default()
        };
        assert_eq!(load_path(&path, &config).unwrap(), sample());
    }

    #[test]
    fn json_output_deserializes_to_series() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_series(&sample(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: Series = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sample());
    }
}
