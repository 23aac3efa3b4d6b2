use chrono::{
    format::{Item, StrftimeItems},
    NaiveDate,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Write,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{
    errors::{BudgetError, Result},
    utils::{
        paths::{app_data_dir, config_file_in},
        persistence::write_atomic,
    },
};

/// Formatting options shared by every report writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub delimiter: char,
    pub date_format: String,
    pub sheet_name: String,
    pub plot_width: u32,
    pub plot_height: u32,
    pub color: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            date_format: "%Y-%m-%d".into(),
            sheet_name: "Breakdown".into(),
            plot_width: 1600,
            plot_height: 900,
            color: true,
            max_rows: None,
        }
    }
}

impl ReportConfig {
    /// Checks values the writers cannot recover from.
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(BudgetError::Config(format!(
                "delimiter `{}` must be a single ASCII character other than a quote or newline",
                self.delimiter.escape_default()
            )));
        }
        if self.date_format.trim().is_empty()
            || StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(BudgetError::Config(format!(
                "date format `{}` is not a valid strftime pattern",
                self.date_format
            )));
        }
        if self.plot_width == 0 || self.plot_height == 0 {
            return Err(BudgetError::Config(format!(
                "plot size {}x{} must be positive",
                self.plot_width, self.plot_height
            )));
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }

    /// Renders `date` with `date_format`, falling back to ISO 8601.
    pub fn format_date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        if write!(out, "{}", date.format(&self.date_format)).is_err() {
            out.clear();
            out.push_str(&crate::dates::format_date_stamp(date));
        }
        out
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|err| BudgetError::Config(format!("{}: {err}", path.display())))?;
        config.validate()?;
        debug!(path = %path.display(), "loaded report configuration");
        Ok(config)
    }
}

/// Loads and stores the user's `config.json` under the app data directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_base_dir(app_data_dir())
    }

    /// The directory is created on first save.
    pub fn with_base_dir(base: PathBuf) -> Self {
        Self {
            path: config_file_in(&base),
        }
    }

    /// Returns defaults when no configuration has been saved yet.
    pub fn load(&self) -> Result<ReportConfig> {
        if self.path.exists() {
            ReportConfig::from_file(&self.path)
        } else {
            debug!(path = %self.path.display(), "no saved configuration, using defaults");
            Ok(ReportConfig::default())
        }
    }

    pub fn save(&self, config: &ReportConfig) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        info!(path = %self.path.display(), "saved report configuration");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf());
        assert_eq!(manager.load().unwrap(), ReportConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().join("nested"));
        let config = ReportConfig {
            delimiter: ';',
            max_rows: Some(10),
            color: false,
            ..ReportConfig::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert!(!manager.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        fs::write(&path, r#"{ "sheet_name": "Plan" }"#).unwrap();
        let config = ReportConfig::from_file(&path).unwrap();
        assert_eq!(config.sheet_name, "Plan");
        assert_eq!(config.delimiter, ',');
    }

    #[test]
    fn rejects_unusable_values() {
        let mut config = ReportConfig {
            delimiter: 'é',
            ..ReportConfig::default()
        };
        assert!(matches!(config.validate(), Err(BudgetError::Config(_))));
        config.delimiter = ',';
        config.plot_height = 0;
        assert!(config.validate().is_err());
        config.plot_height = 900;
        config.date_format = "%Q".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn formats_dates_with_pattern() {
        let date = NaiveDate::from_ymd_opt(2022, 1, 5).unwrap();
        let config = ReportConfig {
            date_format: "%d/%m/%Y".into(),
            ..ReportConfig::default()
        };
        assert_eq!(config.format_date(date), "05/01/2022");
        assert_eq!(ReportConfig::default().format_date(date), "2022-01-05");
    }
}
