//! Data cleaning module for preprocessing datasets.
//!
//! This module provides functionality for:
//! - Normalizing numeric columns to Float64 (financial strings included)
//! - Coercing survey answers to numbers cell by cell
//! - Converting identity columns to text

mod converters;

pub use converters::TextParsing;

use crate::error::{Result, ResultExt, StatdashError};
use converters::{to_float, to_text};
use polars::prelude::*;
use tracing::debug;

/// Data cleaner for column-level conversions.
pub struct DataCleaner;

impl DataCleaner {
    /// Replace each named column with its Float64 rendition.
    ///
    /// Returns the number of cells that held a value before conversion but
    /// are null after it.
    pub fn normalize_numeric<S: AsRef<str>>(
        df: &mut DataFrame,
        columns: &[S],
        parsing: TextParsing,
    ) -> Result<usize> {
        let mut lost = 0;

        for name in columns {
            let name = name.as_ref();
            let series = Self::series(df, name)?;
            let converted = to_float(&series, parsing).context(format!("converting '{name}'"))?;

            let newly_missing = converted.null_count().saturating_sub(series.null_count());
            if newly_missing > 0 {
                debug!("{newly_missing} values in '{name}' could not be parsed as numbers");
            }
            lost += newly_missing;

            df.replace(name, converted)?;
        }

        Ok(lost)
    }

    /// Replace each named column with its String rendition.
    pub fn normalize_text<S: AsRef<str>>(df: &mut DataFrame, columns: &[S]) -> Result<()> {
        for name in columns {
            let name = name.as_ref();
            let series = Self::series(df, name)?;
            df.replace(name, to_text(&series)?)?;
        }
        Ok(())
    }

    fn series(df: &DataFrame, name: &str) -> Result<Series> {
        df.column(name)
            .map(|c| c.as_materialized_series().clone())
            .map_err(|_| StatdashError::ColumnNotFound(name.to_string()))
    }
}
