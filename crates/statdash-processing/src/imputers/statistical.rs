//! Statistical imputation for numeric columns.

use crate::error::{Result, StatdashError};
use crate::utils::{fill_numeric_nulls, float_values};
use polars::prelude::*;
use tracing::warn;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill the missing cells of a numeric column with its median.
    ///
    /// The column is rewritten as Float64. A column with no values at all
    /// keeps its nulls and a warning is logged. Each fill is recorded in
    /// `processing_steps`.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let series = df
            .column(col_name)
            .map_err(|_| StatdashError::ColumnNotFound(col_name.to_string()))?
            .as_materialized_series();

        let values = float_values(series)?.into_series();
        let missing = values.null_count();
        if missing == 0 {
            return Ok(());
        }

        let Some(median_val) = values.median() else {
            warn!("Column '{}' has no values; leaving it missing", col_name);
            return Ok(());
        };

        let filled = fill_numeric_nulls(&values, median_val)?;
        df.replace(col_name, filled)?;

        processing_steps.push(format!(
            "Filled {} missing values in '{}' with median: {:.2}",
            missing, col_name, median_val
        ));

        Ok(())
    }
}
