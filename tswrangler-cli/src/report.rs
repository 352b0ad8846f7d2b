//! Reports for each subcommand: serializable structs plus text rendering.

use serde::Serialize;
use std::fmt::{self, Write};
use tswrangler_core::{
    AlignmentWarning, DatasetHash, EmptyReason, GapMode, GapRun, GapSummary, MissingDays,
    SeriesSummary, WeekdayCounts,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize)]
pub struct OverviewReport {
    pub summary: SeriesSummary,
    pub gaps: GapSummary,
    pub fingerprint: DatasetHash,
}

#[derive(Debug, Serialize)]
pub struct GapsReport {
    pub mode: GapMode,
    pub runs: Vec<GapRun>,
}

#[derive(Debug, Serialize)]
pub struct MissingReport {
    pub missing: MissingDays,
    pub by_weekday: WeekdayCounts,
}

#[derive(Debug, Serialize)]
pub struct MergeReport {
    pub inner: bool,
    pub rows: usize,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_reason: Option<EmptyReason>,
    pub diagnostics: Vec<(String, SeriesSummary)>,
    pub warnings: Vec<AlignmentWarning>,
}

fn fmt_summary(out: &mut String, summary: &SeriesSummary) -> fmt::Result {
    match (summary.first, summary.last) {
        (Some(first), Some(last)) => writeln!(
            out,
            "  span:    {} .. {}",
            first.format(DATE_FORMAT),
            last.format(DATE_FORMAT)
        )?,
        _ => writeln!(out, "  span:    (empty)")?,
    }
    writeln!(out, "  records: {}", summary.count)?;
    for (field, nulls) in &summary.null_counts {
        if *nulls > 0 {
            writeln!(out, "  nulls:   {field} = {nulls}")?;
        }
    }
    Ok(())
}

impl fmt::Display for OverviewReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        fmt_summary(&mut out, &self.summary)?;
        writeln!(out, "  gaps:    {} runs", self.gaps.runs)?;
        writeln!(
            out,
            "  missing: {} days ({} business days)",
            self.gaps.missing_days, self.gaps.missing_business_days
        )?;
        if let Some(longest) = self.gaps.longest {
            writeln!(out, "  longest: {longest} days")?;
        }
        if let Some(coverage) = self.gaps.coverage {
            writeln!(out, "  coverage: {:.1}%", coverage * 100.0)?;
        }
        write!(out, "  fingerprint: {}", self.fingerprint)?;
        f.write_str(&out)
    }
}

impl fmt::Display for GapsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.runs.is_empty() {
            return write!(f, "no gaps");
        }
        writeln!(
            f,
            "{:<12} {:<12} {:>5} {:>9}  weekdays",
            "from", "to", "days", "business"
        )?;
        for (i, run) in self.runs.iter().enumerate() {
            let days = run.days_for(self.mode);
            let (Some(from), Some(to)) = (days.first(), days.last()) else {
                continue;
            };
            let weekdays: Vec<String> = match self.mode {
                GapMode::AllDays => run.weekdays(),
                GapMode::BusinessOnly => run.business_weekdays(),
            }
            .iter()
            .map(|d| d.to_string())
            .collect();
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{:<12} {:<12} {:>5} {:>9}  {}",
                from.format(DATE_FORMAT).to_string(),
                to.format(DATE_FORMAT).to_string(),
                run.calendar_days(),
                run.business_day_count(),
                weekdays.join(",")
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for MissingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.missing.is_empty() {
            return write!(f, "no missing dates");
        }
        writeln!(f, "{} missing dates", self.missing.len())?;
        for date in &self.missing.dates {
            writeln!(f, "  {}", date.format("%Y-%m-%d %a"))?;
        }
        write!(f, "by weekday:")?;
        for (day, count) in self.by_weekday.non_zero() {
            write!(f, " {day}={count}")?;
        }
        Ok(())
    }
}

fn describe_warning(warning: &AlignmentWarning) -> String {
    match warning {
        AlignmentWarning::EmptySeries { series } => format!("series '{series}' has no records"),
        AlignmentWarning::DisjointSpan { series } => {
            format!("series '{series}' does not overlap any other series")
        }
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (name, summary) in &self.diagnostics {
            writeln!(out, "{name}")?;
            fmt_summary(&mut out, summary)?;
        }
        for warning in &self.warnings {
            writeln!(out, "warning: {}", describe_warning(warning))?;
        }
        let kind = if self.inner { "inner" } else { "outer" };
        match self.empty_reason {
            Some(reason) => write!(out, "{kind} merge is empty: {reason}")?,
            None => write!(
                out,
                "{kind} merge: {} rows x {} columns ({})",
                self.rows,
                self.columns.len(),
                self.columns.join(", ")
            )?,
        }
        f.write_str(&out)
    }
}
