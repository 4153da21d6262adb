//! Outlier detection module.
//!
//! Builds per-row outlier flags for numeric columns with either the IQR fence
//! or the standard-score threshold. Missing cells are never flagged.

use crate::config::TabularConfig;
use crate::error::Result;
use crate::profiler::{DataProfiler, quantile};
use crate::types::{OutlierMask, OutlierMethod};
use crate::utils::float_values;
use polars::prelude::*;
use tracing::debug;

/// Detects outliers in numeric columns.
pub struct OutlierDetector {
    iqr_factor: f64,
    zscore_threshold: f64,
}

impl OutlierDetector {
    pub fn new(iqr_factor: f64, zscore_threshold: f64) -> Self {
        Self {
            iqr_factor,
            zscore_threshold,
        }
    }

    pub fn from_config(config: &TabularConfig) -> Self {
        Self::new(config.iqr_factor, config.zscore_threshold)
    }

    /// Flag outlying rows of one column of `df`.
    pub fn detect(&self, df: &DataFrame, column: &str, method: OutlierMethod) -> Result<OutlierMask> {
        let values = DataProfiler::column_floats(df, column)?;
        let flags = self.flags_for(&values, method)?;

        debug!(
            "{} flagged {} of {} rows in '{}'",
            method,
            flags.iter().filter(|&&f| f).count(),
            flags.len(),
            column
        );

        Ok(OutlierMask {
            column: column.to_string(),
            method,
            flags,
        })
    }

    /// Outlier flags for a numeric Series, one per row.
    pub fn flags(&self, series: &Series, method: OutlierMethod) -> Result<Vec<bool>> {
        self.flags_for(&float_values(series)?, method)
    }

    fn flags_for(&self, values: &Float64Chunked, method: OutlierMethod) -> Result<Vec<bool>> {
        match method {
            OutlierMethod::Iqr => self.iqr_flags(values),
            OutlierMethod::Zscore => Ok(self.zscore_flags(values)),
        }
    }

    /// Flag values strictly outside `[Q1 - k·IQR, Q3 + k·IQR]`.
    fn iqr_flags(&self, values: &Float64Chunked) -> Result<Vec<bool>> {
        let (Some(q1), Some(q3)) = (quantile(values, 0.25)?, quantile(values, 0.75)?) else {
            return Ok(vec![false; values.len()]);
        };

        let iqr = q3 - q1;
        let lower = q1 - self.iqr_factor * iqr;
        let upper = q3 + self.iqr_factor * iqr;

        Ok(values
            .into_iter()
            .map(|v| v.is_some_and(|x| x < lower || x > upper))
            .collect())
    }

    /// Flag values whose absolute standard score exceeds the threshold.
    ///
    /// Scores use the population standard deviation. A column with zero
    /// spread has no outliers.
    fn zscore_flags(&self, values: &Float64Chunked) -> Vec<bool> {
        let (Some(mu), Some(sigma)) = (values.mean(), values.std(0)) else {
            return vec![false; values.len()];
        };
        if sigma == 0.0 {
            return vec![false; values.len()];
        }

        values
            .into_iter()
            .map(|v| v.is_some_and(|x| ((x - mu) / sigma).abs() > self.zscore_threshold))
            .collect()
    }
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self::from_config(&TabularConfig::default())
    }
}
