//! Analysis configuration.
//!
//! Defaults reproduce the fixed TMDb pipeline. A JSON file may override any
//! subset of fields:
//! ```json
//! {
//!   "cleaning": { "dropped_columns": ["id", "imdb_id"] },
//!   "report": { "profit_threshold": 50000000, "top_cast": 10 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub cleaning: CleaningConfig,
    pub report: ReportConfig,
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| AnalysisError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Column names driving the cleaning steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Identifiers and unused descriptive columns removed first.
    pub dropped_columns: Vec<String>,
    /// Columns where zero means missing and the row is dropped.
    pub required_nonzero: Vec<String>,
    pub date_column: String,
    /// Four-digit year used to place two-digit `date_column` years in the right century.
    pub year_column: Option<String>,
    pub integer_columns: Vec<String>,
    /// Columns where zero means missing but the row is kept.
    pub nullable_zero: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            dropped_columns: [
                "id",
                "imdb_id",
                "popularity",
                "budget_adj",
                "revenue_adj",
                "homepage",
                "keywords",
                "director",
                "tagline",
                "overview",
                "production_companies",
                "vote_count",
                "vote_average",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            required_nonzero: vec!["budget".into(), "revenue".into()],
            date_column: "release_date".into(),
            year_column: Some("release_year".into()),
            integer_columns: vec!["budget".into(), "revenue".into()],
            nullable_zero: vec!["runtime".into()],
        }
    }
}

/// Parameters of the fixed research questions and chart series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Movies with `profit >= profit_threshold` form the profitable subset.
    pub profit_threshold: i64,
    pub top_cast: usize,
    pub histogram_bins: usize,
    pub separator: char,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            profit_threshold: 25_000_000,
            top_cast: 20,
            histogram_bins: 50,
            separator: '|',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.cleaning.dropped_columns.len(), 13);
        assert_eq!(config.report.profit_threshold, 25_000_000);
        assert_eq!(config.report.separator, '|');
    }

    #[test]
    fn test_load_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "report": {{ "top_cast": 5 }} }}"#).unwrap();

        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.report.top_cast, 5);
        assert_eq!(config.report.histogram_bins, 50);
        assert_eq!(config.cleaning.date_column, "release_date");
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = AnalysisConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::Config { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalysisConfig::load("/nonexistent/tmdb_config.json").unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }
}
