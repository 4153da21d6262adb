//! Configuration types for the dataset processors.
//!
//! Configuration is always passed explicitly when a processor is built;
//! nothing in the crate reads process-wide settings. Each config has a
//! builder with a fluent API that validates on `build()`.

use crate::error::{Result, StatdashError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of the companies table inside the data directory.
pub const COMPANIES_FILE_NAME: &str = "Top_1000_Companies_Dataset.csv";

/// Logical names and file names of the sleep survey sources.
pub const SLEEP_FILE_NAMES: [(&str, &str); 3] = [
    ("bedtime", "quality_of_sleep_bedtime.csv"),
    ("wake_up", "quality_of_sleep_wake-up time.csv"),
    ("sleeping_time", "quality_of_sleep_sleepingtime.csv"),
];

/// Declared kind of a column, overriding the storage-based classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Treat the column as numeric even when stored as text
    /// (its cells go through financial-string normalization).
    Numeric,
    /// Treat the column as categorical even when stored as numbers.
    Text,
}

/// Settings for [`crate::TabularDatasetProcessor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// Case-insensitive name fragments that mark a categorical column as
    /// datetime-like. Default: `["date", "founded"]`
    pub datetime_markers: Vec<String>,

    /// Rows the CSV reader looks at to infer dtypes (None = whole file).
    /// Default: None
    pub infer_schema_length: Option<usize>,

    /// Number of most frequent values reported per categorical column.
    /// Default: 5
    pub top_values: usize,

    /// Fence multiplier for the `iqr` outlier method. Default: 1.5
    pub iqr_factor: f64,

    /// Absolute z-score above which the `zscore` method flags a value.
    /// Default: 3.0
    pub zscore_threshold: f64,

    /// Explicit column kinds. Columns not listed are classified by storage.
    pub column_kinds: BTreeMap<String, ColumnKind>,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            datetime_markers: vec!["date".to_string(), "founded".to_string()],
            infer_schema_length: None,
            top_values: 5,
            iqr_factor: 1.5,
            zscore_threshold: 3.0,
            column_kinds: BTreeMap::new(),
        }
    }
}

impl TabularConfig {
    /// Create a new configuration builder.
    pub fn builder() -> TabularConfigBuilder {
        TabularConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.top_values == 0 {
            return Err(ConfigValidationError::InvalidTopValues(self.top_values));
        }
        check_positive("iqr_factor", self.iqr_factor)?;
        check_positive("zscore_threshold", self.zscore_threshold)?;
        if self.infer_schema_length == Some(0) {
            return Err(ConfigValidationError::InvalidSchemaLength);
        }
        Ok(())
    }
}

/// Builder for [`TabularConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct TabularConfigBuilder {
    datetime_markers: Option<Vec<String>>,
    infer_schema_length: Option<Option<usize>>,
    top_values: Option<usize>,
    iqr_factor: Option<f64>,
    zscore_threshold: Option<f64>,
    column_kinds: BTreeMap<String, ColumnKind>,
}

impl TabularConfigBuilder {
    /// Replace the name fragments used to flag datetime-like columns.
    pub fn datetime_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datetime_markers = Some(markers.into_iter().map(Into::into).collect());
        self
    }

    /// Set how many rows the CSV reader scans to infer dtypes.
    pub fn infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Set how many frequent values are reported per categorical column.
    pub fn top_values(mut self, n: usize) -> Self {
        self.top_values = Some(n);
        self
    }

    /// Set the IQR fence multiplier.
    pub fn iqr_factor(mut self, factor: f64) -> Self {
        self.iqr_factor = Some(factor);
        self
    }

    /// Set the z-score threshold.
    pub fn zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = Some(threshold);
        self
    }

    /// Declare the kind of a single column.
    pub fn column_kind(mut self, column: impl Into<String>, kind: ColumnKind) -> Self {
        self.column_kinds.insert(column.into(), kind);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> std::result::Result<TabularConfig, ConfigValidationError> {
        let defaults = TabularConfig::default();
        let config = TabularConfig {
            datetime_markers: self.datetime_markers.unwrap_or(defaults.datetime_markers),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            top_values: self.top_values.unwrap_or(defaults.top_values),
            iqr_factor: self.iqr_factor.unwrap_or(defaults.iqr_factor),
            zscore_threshold: self.zscore_threshold.unwrap_or(defaults.zscore_threshold),
            column_kinds: self.column_kinds,
        };

        config.validate()?;
        Ok(config)
    }
}

/// One file of a multi-file survey, keyed by its logical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySource {
    pub name: String,
    pub path: PathBuf,
}

impl SurveySource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Settings for [`crate::MultiSourceSurveyProcessor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// Sources in load and concatenation order.
    pub sources: Vec<SurveySource>,

    /// Source whose table provides the category inventory.
    /// Default: "bedtime"
    pub reference_source: String,

    /// Respondent sex column. Default: "sex"
    pub sex_column: String,

    /// Time period column. Default: "time"
    pub time_column: String,

    /// Academic term column. Default: "terms"
    pub terms_column: String,

    /// Column added at integration to tag each row with its source.
    /// Default: "source"
    pub source_column: String,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            reference_source: "bedtime".to_string(),
            sex_column: "sex".to_string(),
            time_column: "time".to_string(),
            terms_column: "terms".to_string(),
            source_column: "source".to_string(),
        }
    }
}

impl SurveyConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SurveyConfigBuilder {
        SurveyConfigBuilder::default()
    }

    /// The three sleep files under `data_dir`, with default column names.
    pub fn sleep_files(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            sources: SLEEP_FILE_NAMES
                .iter()
                .map(|(name, file)| SurveySource::new(*name, data_dir.join(file)))
                .collect(),
            ..Self::default()
        }
    }

    /// Columns describing the respondent rather than a habit.
    pub fn identity_columns(&self) -> [&str; 3] {
        [
            self.sex_column.as_str(),
            self.time_column.as_str(),
            self.terms_column.as_str(),
        ]
    }

    /// Identity columns plus the source tag; never coerced to numeric.
    pub fn is_identity_column(&self, name: &str) -> bool {
        name == self.source_column || self.identity_columns().contains(&name)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        let mut seen = std::collections::HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(ConfigValidationError::EmptySourceName);
            }
            if !seen.insert(source.name.as_str()) {
                return Err(ConfigValidationError::DuplicateSource(source.name.clone()));
            }
        }

        if !self.sources.is_empty() && !seen.contains(self.reference_source.as_str()) {
            return Err(ConfigValidationError::UnknownReference(
                self.reference_source.clone(),
            ));
        }

        if self.identity_columns().contains(&self.source_column.as_str()) {
            return Err(ConfigValidationError::SourceColumnClash(
                self.source_column.clone(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`SurveyConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct SurveyConfigBuilder {
    sources: Vec<SurveySource>,
    reference_source: Option<String>,
    sex_column: Option<String>,
    time_column: Option<String>,
    terms_column: Option<String>,
    source_column: Option<String>,
}

impl SurveyConfigBuilder {
    /// Append a source. Sources are loaded and stacked in insertion order.
    pub fn source(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.sources.push(SurveySource::new(name, path));
        self
    }

    /// Set the source used for the category inventory.
    pub fn reference_source(mut self, name: impl Into<String>) -> Self {
        self.reference_source = Some(name.into());
        self
    }

    pub fn sex_column(mut self, name: impl Into<String>) -> Self {
        self.sex_column = Some(name.into());
        self
    }

    pub fn time_column(mut self, name: impl Into<String>) -> Self {
        self.time_column = Some(name.into());
        self
    }

    pub fn terms_column(mut self, name: impl Into<String>) -> Self {
        self.terms_column = Some(name.into());
        self
    }

    /// Set the name of the source-tag column added at integration.
    pub fn source_column(mut self, name: impl Into<String>) -> Self {
        self.source_column = Some(name.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> std::result::Result<SurveyConfig, ConfigValidationError> {
        let defaults = SurveyConfig::default();
        let config = SurveyConfig {
            sources: self.sources,
            reference_source: self.reference_source.unwrap_or(defaults.reference_source),
            sex_column: self.sex_column.unwrap_or(defaults.sex_column),
            time_column: self.time_column.unwrap_or(defaults.time_column),
            terms_column: self.terms_column.unwrap_or(defaults.terms_column),
            source_column: self.source_column.unwrap_or(defaults.source_column),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Full dashboard configuration: where both dataset families live and how
/// each is processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Path of the companies CSV.
    pub companies_file: PathBuf,
    /// Companies processing settings.
    pub companies: TabularConfig,
    /// Sleep survey sources and settings.
    pub sleep: SurveyConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::from_data_dir("data")
    }
}

impl DashboardConfig {
    /// Standard file layout under a data directory.
    pub fn from_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            companies_file: data_dir.join(COMPANIES_FILE_NAME),
            companies: TabularConfig::default(),
            sleep: SurveyConfig::sleep_files(data_dir),
        }
    }

    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: DashboardConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| StatdashError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate both processor configs.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        self.companies.validate()?;
        self.sleep.validate()
    }
}

fn check_positive(field: &str, value: f64) -> std::result::Result<(), ConfigValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigValidationError::NotPositive {
            field: field.to_string(),
            value,
        })
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value} (must be a finite number above 0)")]
    NotPositive { field: String, value: f64 },

    #[error("Invalid top value count: {0} (must be at least 1)")]
    InvalidTopValues(usize),

    #[error("Schema inference length must be at least 1 row")]
    InvalidSchemaLength,

    #[error("Survey source names must not be empty")]
    EmptySourceName,

    #[error("Survey source '{0}' is configured more than once")]
    DuplicateSource(String),

    #[error("Reference source '{0}' is not one of the configured sources")]
    UnknownReference(String),

    #[error("Source column '{0}' clashes with an identity column")]
    SourceColumnClash(String),
}

impl From<ConfigValidationError> for StatdashError {
    fn from(e: ConfigValidationError) -> Self {
        StatdashError::InvalidConfig(e.to_string())
    }
}
