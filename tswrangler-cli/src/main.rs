//! TSWrangler CLI — inspect gaps in daily series, fill them, merge series.
//!
//! Commands:
//! - `overview`: span, record count, null counts and gap totals
//! - `gaps`: the biggest runs of missing dates
//! - `missing`: every missing date with counts by weekday
//! - `fill`: forward-fill onto a complete daily or business-day index
//! - `weekdays`: drop weekend records
//! - `merge`: outer or inner combination of named series

mod config;
mod loader;
mod output;
mod report;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tswrangler_core::{
    Frequency, GapAnalyzer, GapMode, Intersection, NamedSeriesCollection, Series, SeriesAligner,
};

use config::Config;
use report::{GapsReport, MergeReport, MissingReport, OverviewReport};

#[derive(Parser)]
#[command(
    name = "tswrangler",
    about = "TSWrangler CLI — gap analysis and alignment for daily time series"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Date format of CSV inputs (chrono syntax). Overrides the config file.
    #[arg(long, global = true)]
    date_format: Option<String>,

    /// Print machine-readable JSON reports.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Span, record count, null counts and gap totals of one series.
    Overview {
        /// Input file (.csv or .parquet).
        input: PathBuf,
    },
    /// List the biggest gap runs.
    Gaps {
        input: PathBuf,

        /// Rank by missing business days instead of calendar days.
        #[arg(long, default_value_t = false)]
        business: bool,

        /// Number of runs to show. Defaults to the config's top_k.
        #[arg(long)]
        top: Option<usize>,
    },
    /// List every missing date.
    Missing {
        input: PathBuf,

        /// Only business days are expected.
        #[arg(long, default_value_t = false)]
        business: bool,
    },
    /// Forward-fill onto a complete index.
    Fill {
        input: PathBuf,

        /// Fill business days only.
        #[arg(long, default_value_t = false)]
        business: bool,

        /// Output file; format follows the extension (.csv, .json, .parquet).
        #[arg(long)]
        output: PathBuf,
    },
    /// Drop weekend records.
    Weekdays {
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },
    /// Combine named series over the date axis.
    Merge {
        /// Inputs as NAME=PATH.
        #[arg(required = true, value_parser = parse_named_input)]
        inputs: Vec<(String, PathBuf)>,

        /// Keep only dates present in every series.
        #[arg(long, default_value_t = false)]
        inner: bool,

        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let mut config = match &cli.global.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(format) = &cli.global.date_format {
        config.loader.date_format = format.clone();
    }
    let json = cli.global.json;

    match cli.command {
        Commands::Overview { input } => run_overview(&config, &input, json),
        Commands::Gaps {
            input,
            business,
            top,
        } => {
            let mode = if business {
                GapMode::BusinessOnly
            } else {
                config.gaps.mode
            };
            let top = top.unwrap_or(config.gaps.top_k);
            run_gaps(&config, &input, mode, top, json)
        }
        Commands::Missing { input, business } => {
            run_missing(&config, &input, frequency(business), json)
        }
        Commands::Fill {
            input,
            business,
            output,
        } => run_fill(&config, &input, frequency(business), &output),
        Commands::Weekdays { input, output } => run_weekdays(&config, &input, &output),
        Commands::Merge {
            inputs,
            inner,
            output,
        } => run_merge(&config, inputs, inner, output.as_deref(), json),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn frequency(business: bool) -> Frequency {
    if business {
        Frequency::BusinessDays
    } else {
        Frequency::AllDays
    }
}

fn parse_named_input(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.is_empty() => {
            Ok((name.trim().to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got '{s}'")),
    }
}

fn load(config: &Config, path: &Path) -> Result<Series> {
    let series = loader::load_path(path, &config.loader)
        .with_context(|| format!("failed to load {}", path.display()))?;
    tracing::info!(path = %path.display(), records = series.len(), "loaded series");
    Ok(series)
}

fn analyzer<'a>(config: &Config, series: &'a Series) -> Result<GapAnalyzer<'a>> {
    Ok(GapAnalyzer::with_calendar(series, config.calendar())?)
}

fn emit<T: Serialize + Display>(report: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn run_overview(config: &Config, input: &Path, json: bool) -> Result<()> {
    let series = load(config, input)?;
    let report = OverviewReport {
        summary: series.summary(),
        gaps: analyzer(config, &series)?.gap_summary(),
        fingerprint: series.fingerprint(),
    };
    emit(&report, json)
}

fn run_gaps(config: &Config, input: &Path, mode: GapMode, top: usize, json: bool) -> Result<()> {
    let series = load(config, input)?;
    let runs = analyzer(config, &series)?.biggest_gaps(mode, top);
    emit(&GapsReport { mode, runs }, json)
}

fn run_missing(config: &Config, input: &Path, frequency: Frequency, json: bool) -> Result<()> {
    let series = load(config, input)?;
    let missing = analyzer(config, &series)?.report_missing_days(frequency);
    let report = MissingReport {
        by_weekday: missing.by_weekday(),
        missing,
    };
    emit(&report, json)
}

fn run_fill(config: &Config, input: &Path, frequency: Frequency, output: &Path) -> Result<()> {
    let series = load(config, input)?;
    let filled = analyzer(config, &series)?.fill_forward(frequency);
    tracing::info!(
        before = series.len(),
        after = filled.len(),
        "forward-filled series"
    );
    output::write_series(&filled, output)
}

fn run_weekdays(config: &Config, input: &Path, output: &Path) -> Result<()> {
    let series = load(config, input)?;
    let kept = analyzer(config, &series)?.remove_weekends();
    tracing::info!(
        removed = series.len() - kept.len(),
        "dropped weekend records"
    );
    output::write_series(&kept, output)
}

fn run_merge(
    config: &Config,
    inputs: Vec<(String, PathBuf)>,
    inner: bool,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut collection = NamedSeriesCollection::new();
    for (name, path) in inputs {
        let series = load(config, &path)?;
        collection
            .insert(name.as_str(), series)
            .with_context(|| format!("cannot add series '{name}'"))?;
    }
    let aligner = SeriesAligner::new(collection)?;

    let warnings = aligner.warnings();
    for warning in &warnings {
        tracing::warn!(?warning, "alignment warning");
    }

    let (table, empty_reason) = if inner {
        match aligner.intersection() {
            Intersection::Rows(table) => (Some(table), None),
            Intersection::Empty(reason) => (None, Some(reason)),
        }
    } else {
        (Some(aligner.union()), None)
    };

    if let (Some(table), Some(path)) = (&table, output) {
        output::write_series(table.series(), path)?;
    } else if output.is_some() {
        bail!("nothing to write: inner merge is empty");
    }

    let report = MergeReport {
        inner,
        rows: table.as_ref().map_or(0, |t| t.len()),
        columns: aligner.columns(),
        empty_reason,
        diagnostics: aligner.diagnostics().into_iter().collect(),
        warnings,
    };
    emit(&report, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn named_input_parsing() {
        assert_eq!(
            parse_named_input("usd=data/usd.csv").unwrap(),
            ("usd".to_string(), PathBuf::from("data/usd.csv"))
        );
        assert!(parse_named_input("data/usd.csv").is_err());
        assert!(parse_named_input("=data/usd.csv").is_err());
        assert!(parse_named_input("usd=").is_err());
    }

    #[test]
    fn merge_arguments_parse() {
        let cli = Cli::try_parse_from([
            "tswrangler",
            "merge",
            "a=a.csv",
            "b=b.csv",
            "--inner",
            "--json",
        ])
        .unwrap();
        assert!(cli.global.json);
        match cli.command {
            Commands::Merge { inputs, inner, .. } => {
                assert!(inner);
                assert_eq!(inputs.len(), 2);
                assert_eq!(inputs[1].0, "b");
            }
            _ => panic!("expected merge"),
        }
    }

    #[test]
    fn merge_writes_outer_table() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "Date,Price\n01/03/2022,1.0\n01/04/2022,2.0\n").unwrap();
        std::fs::write(&b, "Date,Price\n01/04/2022,20.0\n01/05/2022,30.0\n").unwrap();
        let out = dir.path().join("merged.csv");

        run_merge(
            &Config::default(),
            vec![("a".into(), a), ("b".into(), b)],
            false,
            Some(&out),
            true,
        )
        .unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Price_a,Price_b");
        assert_eq!(lines[1], "2022-01-03,1,");
        assert_eq!(lines[2], "2022-01-04,2,20");
        assert_eq!(lines[3], "2022-01-05,,30");
    }

    #[test]
    fn empty_inner_merge_refuses_to_write() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "Date,Price\n01/03/2022,1.0\n").unwrap();
        std::fs::write(&b, "Date,Price\n02/03/2022,2.0\n").unwrap();
        let inputs = vec![("a".to_string(), a), ("b".to_string(), b)];

        assert!(run_merge(&Config::default(), inputs.clone(), true, None, false).is_ok());
        let out = dir.path().join("merged.csv");
        assert!(run_merge(&Config::default(), inputs, true, Some(&out), false).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn fill_then_weekdays_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        // Fri 2022-01-07 and Tue 2022-01-11
        std::fs::write(&input, "Date,Price\n01/11/2022,2.0\n01/07/2022,1.0\n").unwrap();
        let config = Config::default();

        let filled = dir.path().join("filled.parquet");
        run_fill(&config, &input, Frequency::AllDays, &filled).unwrap();
        let series = loader::load_path(&filled, &config.loader).unwrap();
        assert_eq!(series.len(), 5);

        let trimmed = dir.path().join("weekdays.json");
        run_weekdays(&config, &filled, &trimmed).unwrap();
        let text = std::fs::read_to_string(&trimmed).unwrap();
        let kept: Series = serde_json::from_str(&text).unwrap();
        assert_eq!(kept.len(), 3);
    }
}
