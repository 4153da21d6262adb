//! Statistics Dashboard Processing Library
//!
//! The data cleaning and statistics core behind a small statistics dashboard,
//! built on Polars.
//!
//! # Overview
//!
//! Two processors cover the two dataset families:
//!
//! - **[`TabularDatasetProcessor`]**: loads one CSV, classifies columns
//!   (numeric / categorical / datetime-like), normalizes currency and
//!   suffix-encoded numbers (`"$1.2B"`, `"500K"`), fills missing numeric
//!   values with the column median, summarizes, and detects outliers
//! - **[`MultiSourceSurveyProcessor`]**: loads several survey files that
//!   share identity columns, records the reference categories, and stacks
//!   every source into one table tagged with its origin
//!
//! Each step checks that the previous one ran; calling out of order fails
//! with a sequencing error instead of returning partial results.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use statdash_processing::{
//!     DashboardConfig, MultiSourceSurveyProcessor, OutlierMethod, TabularDatasetProcessor,
//! };
//!
//! # fn main() -> statdash_processing::Result<()> {
//! let config = DashboardConfig::from_data_dir("data");
//!
//! let mut companies = TabularDatasetProcessor::new(config.companies.clone());
//! companies.load(&config.companies_file)?;
//! companies.classify_columns()?;
//! companies.clean_numeric()?;
//! let summary = companies.summary_statistics()?;
//! let masks = companies.detect_outliers(None, OutlierMethod::Iqr)?;
//!
//! let mut sleep = MultiSourceSurveyProcessor::new(config.sleep.clone());
//! sleep.load_all()?;
//! sleep.integrate()?;
//! let survey_summary = sleep.summary_statistics()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Use [`TabularConfig`] and [`SurveyConfig`] to customize processing:
//!
//! ```rust
//! use statdash_processing::config::{ColumnKind, SurveyConfig, TabularConfig};
//!
//! let companies = TabularConfig::builder()
//!     .column_kind("Revenue", ColumnKind::Numeric) // "$1.2B" text parsed as money
//!     .top_values(3)
//!     .zscore_threshold(2.5)
//!     .build()
//!     .unwrap();
//!
//! let sleep = SurveyConfig::builder()
//!     .source("bedtime", "data/bedtime.csv")
//!     .source("wake_up", "data/wake_up.csv")
//!     .reference_source("bedtime")
//!     .build()
//!     .unwrap();
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ColumnKind, ConfigValidationError, DashboardConfig, SurveyConfig, SurveySource, TabularConfig,
};
pub use error::{Result, ResultExt, StatdashError};
pub use pipeline::{MultiSourceSurveyProcessor, OutlierDetector, TabularDatasetProcessor};
pub use reporting::{DatasetReport, ReportGenerator};
pub use types::{
    CategoryInventory, ColumnClassification, CrossTab, DescribeTable, DescriptiveStats,
    OutlierMask, OutlierMethod, SummaryResult, SummaryTable, TopValues, TopValuesTable, ValueCount,
};
pub use utils::normalize_financial_string;
