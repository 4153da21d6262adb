//! Column type rules used by classification.

use crate::config::ColumnKind;
use crate::utils::is_numeric_dtype;
use polars::prelude::*;

/// Decide whether a column is numeric.
///
/// A declared kind wins. Otherwise the column is numeric when its storage
/// dtype is an integer or float type: every present cell then holds a
/// number, and missing cells do not affect the decision.
pub(crate) fn is_numeric_column(dtype: &DataType, declared: Option<ColumnKind>) -> bool {
    match declared {
        Some(ColumnKind::Numeric) => true,
        Some(ColumnKind::Text) => false,
        None => is_numeric_dtype(dtype),
    }
}

/// Name-only heuristic for datetime-like columns.
///
/// Matches when the lowercased name contains any marker. Values are not
/// inspected.
pub(crate) fn is_datetime_like_name(name: &str, markers: &[String]) -> bool {
    let lower = name.to_lowercase();
    markers
        .iter()
        .any(|marker| lower.contains(&marker.to_lowercase()))
}
