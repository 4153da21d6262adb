//! Column conversion functions for data cleaning.

use crate::utils::{is_numeric_dtype, normalize_financial_string, parse_number};
use polars::prelude::*;

/// How text cells are turned into numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextParsing {
    /// `$`/`,` stripped, `K`/`M`/`B` suffixes expanded
    Financial,
    /// Plain number literal only
    Plain,
}

/// Convert any column to Float64.
///
/// Numeric and boolean columns are cast. Everything else is read as text and
/// parsed cell by cell; cells that do not parse become null.
pub(crate) fn to_float(series: &Series, parsing: TextParsing) -> PolarsResult<Series> {
    let dtype = series.dtype();
    if is_numeric_dtype(dtype) || dtype == &DataType::Boolean || dtype == &DataType::Null {
        return series.cast(&DataType::Float64);
    }

    let parse = match parsing {
        TextParsing::Financial => normalize_financial_string,
        TextParsing::Plain => parse_number,
    };

    let text = series.cast(&DataType::String)?;
    let values: Vec<Option<f64>> = text
        .str()?
        .into_iter()
        .map(|cell| cell.and_then(parse))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Convert any column to String, keeping nulls.
pub(crate) fn to_text(series: &Series) -> PolarsResult<Series> {
    series.cast(&DataType::String)
}
