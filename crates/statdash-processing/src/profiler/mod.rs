//! Data profiling module for dataset analysis.
//!
//! This module provides functionality for profiling datasets, including:
//! - Column classification (numeric / categorical / datetime-like)
//! - Describe tables for numeric columns
//! - Top-N value counts for categorical columns
//! - Cross-tabulation of two label columns

mod statistics;
mod type_inference;

use crate::config::TabularConfig;
use crate::error::{Result, StatdashError};
use crate::types::{ColumnClassification, CrossTab, DescribeTable, TopValuesTable};
use crate::utils::{float_values, is_numeric_dtype, text_values};
use polars::prelude::*;
use tracing::debug;

pub(crate) use statistics::quantile;

/// Data profiler for column classification and summary statistics.
pub struct DataProfiler;

impl DataProfiler {
    /// Partition the columns of a table by value type.
    ///
    /// Every column lands in exactly one of `numeric` or `categorical`;
    /// categorical columns whose name matches a datetime marker are also
    /// listed in `datetime_like`.
    pub fn classify_columns(df: &DataFrame, config: &TabularConfig) -> ColumnClassification {
        let mut classification = ColumnClassification::default();

        for column in df.get_columns() {
            let name = column.name().as_str();
            let declared = config.column_kinds.get(name).copied();

            if type_inference::is_numeric_column(column.dtype(), declared) {
                classification.numeric.push(name.to_string());
            } else {
                if type_inference::is_datetime_like_name(name, &config.datetime_markers) {
                    classification.datetime_like.push(name.to_string());
                }
                classification.categorical.push(name.to_string());
            }
        }

        debug!(
            "Classified {} numeric, {} categorical ({} datetime-like) columns",
            classification.numeric.len(),
            classification.categorical.len(),
            classification.datetime_like.len()
        );

        classification
    }

    /// Describe table for the given numeric columns, in the order given.
    pub fn describe<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<DescribeTable> {
        let mut table = DescribeTable::default();
        for name in columns {
            let name = name.as_ref();
            let values = Self::column_floats(df, name)?;
            table.columns.push(statistics::describe(name, &values)?);
        }
        Ok(table)
    }

    /// Top `n` values for each of the given columns, rendered as text.
    pub fn top_values<S: AsRef<str>>(
        df: &DataFrame,
        columns: &[S],
        n: usize,
    ) -> Result<TopValuesTable> {
        let mut table = TopValuesTable {
            top_n: n,
            columns: Vec::with_capacity(columns.len()),
        };
        for name in columns {
            let name = name.as_ref();
            let column = df
                .column(name)
                .map_err(|_| StatdashError::ColumnNotFound(name.to_string()))?;
            table.columns.push(statistics::top_values(
                name,
                column.as_materialized_series(),
                n,
            )?);
        }
        Ok(table)
    }

    /// Count rows for every (row_field value, column_field value) pair.
    pub fn cross_tab(df: &DataFrame, row_field: &str, column_field: &str) -> Result<CrossTab> {
        let rows = Self::column_text(df, row_field)?;
        let columns = Self::column_text(df, column_field)?;
        Ok(statistics::cross_tabulate(
            row_field,
            &rows,
            column_field,
            &columns,
        ))
    }

    /// A numeric column as Float64, NaN treated as missing.
    pub(crate) fn column_floats(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
        let column = df
            .column(name)
            .map_err(|_| StatdashError::ColumnNotFound(name.to_string()))?;
        if !is_numeric_dtype(column.dtype()) && column.dtype() != &DataType::Boolean {
            return Err(StatdashError::NonNumericColumn(name.to_string()));
        }
        Ok(float_values(column.as_materialized_series())?)
    }

    /// Values of a column as optional text.
    pub(crate) fn column_text(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
        let column = df
            .column(name)
            .map_err(|_| StatdashError::ColumnNotFound(name.to_string()))?;
        Ok(text_values(column.as_materialized_series())?)
    }
}
