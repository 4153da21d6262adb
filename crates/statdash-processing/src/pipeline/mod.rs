//! Pipeline module.
//!
//! This module provides the dataset processors and outlier detection.

pub mod outliers;
mod survey;
mod tabular;

pub use outliers::OutlierDetector;
pub use survey::MultiSourceSurveyProcessor;
pub use tabular::TabularDatasetProcessor;
