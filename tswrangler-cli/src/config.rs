//! TOML configuration for the `tswrangler` binary.
//!
//! Every section is optional; missing keys take their defaults and unknown
//! keys are rejected. Command-line flags override file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tswrangler_core::{Calendar, GapMode, WeekendMask};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub calendar: CalendarConfig,
    pub gaps: GapsConfig,
    pub loader: LoaderConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The single calendar every business-day path uses.
    pub fn calendar(&self) -> Calendar {
        Calendar::new(self.calendar.weekend)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// Weekday names, e.g. `["Sat", "Sun"]`.
    pub weekend: WeekendMask,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GapsConfig {
    pub top_k: usize,
    pub mode: GapMode,
}

impl Default for GapsConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            mode: GapMode::AllDays,
        }
    }
}

/// How CSV exports are read. Formats are never guessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    pub date_column: String,
    /// chrono format string for the date column.
    pub date_format: String,
    /// Columns whose cells may carry a trailing `%`.
    pub percent_columns: Vec<String>,
    pub skip_columns: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            date_column: "Date".into(),
            date_format: "%m/%d/%Y".into(),
            percent_columns: vec!["Change %".into()],
            skip_columns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.gaps.top_k, 5);
        assert_eq!(config.loader.date_format, "%m/%d/%Y");
        assert_eq!(config.calendar(), Calendar::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_toml(
            r#"
            [calendar]
            weekend = ["Fri", "Sat"]

            [gaps]
            top_k = 3
            mode = "business_only"

            [loader]
            date_format = "%Y-%m-%d"
            skip_columns = ["Vol."]
            "#,
        )
        .unwrap();
        let weekend = config.calendar().weekend();
        assert!(weekend.contains(Weekday::Fri));
        assert!(weekend.contains(Weekday::Sat));
        assert!(!weekend.contains(Weekday::Sun));
        assert_eq!(config.gaps.top_k, 3);
        assert_eq!(config.gaps.mode, GapMode::BusinessOnly);
        assert_eq!(config.loader.date_column, "Date");
        assert_eq!(config.loader.skip_columns, vec!["Vol.".to_string()]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("[gaps]\ntop = 3\n").is_err());
        assert!(Config::from_toml("[plotting]\nwidth = 3\n").is_err());
    }

    #[test]
    fn unknown_weekday_is_rejected() {
        let err = Config::from_toml("[calendar]\nweekend = [\"Caturday\"]\n").unwrap_err();
        assert!(err.to_string().contains("Caturday"));
    }

    #[test]
    fn from_file_names_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
