//! Error types for the dataset processors.
//!
//! Structural failures (unreadable files, calls made out of order, unknown
//! outlier methods) are reported through [`StatdashError`]. Cell-level parse
//! failures never show up here: they resolve to a missing value and
//! processing carries on.
//!
//! Errors are serializable so a presentation layer can show them directly.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the dataset processors.
#[derive(Error, Debug)]
pub enum StatdashError {
    /// A delimited file could not be read or parsed as a table.
    #[error("Failed to load '{}': {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    /// One source of a multi-file dataset failed to load.
    #[error("Error reading {name} file: {cause}")]
    SourceLoad {
        name: String,
        #[source]
        cause: Box<StatdashError>,
    },

    /// An operation needed a loaded table but nothing is loaded.
    #[error("No data loaded. Please load data first")]
    NotLoaded,

    /// Cleaning was requested before the columns were classified.
    #[error("Columns have not been classified yet")]
    NotClassified,

    /// Statistics were requested before numeric cleaning ran.
    #[error("Data not processed. Please process data first")]
    NotProcessed,

    /// Statistics were requested before the sources were integrated.
    #[error("Data has not been integrated yet")]
    NotIntegrated,

    /// The reference source used for category extraction is not loaded.
    #[error("Reference source '{0}' is missing")]
    MissingReference(String),

    /// An outlier detection method other than `iqr` or `zscore` was requested.
    #[error("Outlier method '{0}' is not supported (expected 'iqr' or 'zscore')")]
    UnsupportedMethod(String),

    /// Integration had nothing to combine.
    #[error("No valid datasets to combine")]
    NoValidSources,

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A numeric operation was asked of a column classified as categorical.
    #[error("Column '{0}' is not numeric")]
    NonNumericColumn(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<StatdashError>,
    },
}

impl StatdashError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        StatdashError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Load { .. } => "LOAD_ERROR",
            Self::SourceLoad { .. } => "LOAD_ERROR",
            Self::NotLoaded => "NOT_LOADED",
            Self::NotClassified => "NOT_CLASSIFIED",
            Self::NotProcessed => "NOT_PROCESSED",
            Self::NotIntegrated => "NOT_INTEGRATED",
            Self::MissingReference(_) => "MISSING_REFERENCE",
            Self::UnsupportedMethod(_) => "UNSUPPORTED_METHOD",
            Self::NoValidSources => "NO_VALID_SOURCES",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NonNumericColumn(_) => "NON_NUMERIC_COLUMN",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error means a processor method was called out of order.
    pub fn is_sequencing(&self) -> bool {
        match self {
            Self::NotLoaded
            | Self::NotClassified
            | Self::NotProcessed
            | Self::NotIntegrated
            | Self::MissingReference(_) => true,
            Self::WithContext { source, .. } => source.is_sequencing(),
            _ => false,
        }
    }

    /// Name of the survey source that failed to load, if any.
    pub fn failed_source(&self) -> Option<&str> {
        match self {
            Self::SourceLoad { name, .. } => Some(name),
            Self::WithContext { source, .. } => source.failed_source(),
            _ => None,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for StatdashError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("StatdashError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processor operations.
pub type Result<T> = std::result::Result<T, StatdashError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| StatdashError::Polars(e).with_context(context))
    }
}
