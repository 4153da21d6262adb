//! Shared utilities for the dataset processors.
//!
//! Cell-level parsing (financial strings, plain numeric coercion) and the
//! helpers that move column data between polars and plain vectors.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters stripped from financial strings before parsing.
pub const FINANCIAL_FORMAT_CHARS: [char; 2] = ['$', ','];

/// Magnitude suffixes, checked in this order; the first match wins.
pub const MAGNITUDE_SUFFIXES: [(char, f64); 3] = [('K', 1e3), ('M', 1e6), ('B', 1e9)];

/// Parse a plain number, treating anything unparseable (or NaN) as missing.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Normalize a currency/suffix-encoded string such as `"$1.2B"` or `"500K"`.
///
/// `$` and `,` are removed, the text is uppercased, and a trailing `K`, `M`
/// or `B` multiplies the numeric prefix by 1e3, 1e6 or 1e9. Returns `None`
/// when the remaining text is not a number.
///
/// # Example
///
/// ```rust
/// use statdash_processing::utils::normalize_financial_string;
///
/// assert_eq!(normalize_financial_string("$1.2B"), Some(1.2e9));
/// assert_eq!(normalize_financial_string("500K"), Some(5e5));
/// assert_eq!(normalize_financial_string("N/A"), None);
/// ```
pub fn normalize_financial_string(s: &str) -> Option<f64> {
    let mut cleaned = s.to_uppercase();
    cleaned.retain(|c| !FINANCIAL_FORMAT_CHARS.contains(&c));

    for (suffix, multiplier) in MAGNITUDE_SUFFIXES {
        if let Some(prefix) = cleaned.strip_suffix(suffix) {
            return parse_number(prefix).map(|v| v * multiplier);
        }
    }

    parse_number(&cleaned)
}

// =============================================================================
// Series Access Utilities
// =============================================================================

/// Cast a numeric-castable Series to Float64, treating NaN as missing.
pub fn float_values(series: &Series) -> PolarsResult<Float64Chunked> {
    let float_series = series.cast(&DataType::Float64)?;
    let values: Float64Chunked = float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values.with_name(series.name().clone()))
}

/// Read any Series as optional text (null → `None`).
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Distinct non-missing values in order of first appearance.
pub fn distinct_in_order(values: &[Option<String>]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut distinct = Vec::new();
    for value in values.iter().flatten() {
        if seen.insert(value.as_str()) {
            distinct.push(value.clone());
        }
    }
    distinct
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    Ok(float_values(series)?
        .fill_null_with_values(fill_value)?
        .into_series())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_normalize_financial_string_suffixes() {
        assert_eq!(normalize_financial_string("$1.2B"), Some(1.2e9));
        assert_eq!(normalize_financial_string("500K"), Some(5e5));
        assert_eq!(normalize_financial_string("$3M"), Some(3e6));
        assert_eq!(normalize_financial_string("2.5k"), Some(2500.0));
    }

    #[test]
    fn test_normalize_financial_string_separators() {
        assert_eq!(normalize_financial_string("$1,234.5"), Some(1234.5));
        assert_eq!(normalize_financial_string("1,000,000"), Some(1e6));
        assert_eq!(normalize_financial_string(" 42 "), Some(42.0));
        assert_eq!(normalize_financial_string("-7"), Some(-7.0));
    }

    #[test]
    fn test_normalize_financial_string_unparseable() {
        assert_eq!(normalize_financial_string("N/A"), None);
        assert_eq!(normalize_financial_string(""), None);
        assert_eq!(normalize_financial_string("$"), None);
        assert_eq!(normalize_financial_string("B"), None);
        assert_eq!(normalize_financial_string("abcM"), None);
        assert_eq!(normalize_financial_string("nan"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("3.5"), Some(3.5));
        assert_eq!(parse_number(" 1e3 "), Some(1000.0));
        assert_eq!(parse_number("1,000"), None);
        assert_eq!(parse_number("often"), None);
    }

    #[test]
    fn test_float_values_keeps_nulls() {
        let series = Series::new("v".into(), &[Some(1i64), None, Some(3)]);
        let values = float_values(&series).unwrap();

        assert_eq!(values.name().as_str(), "v");
        assert_eq!(
            values.into_iter().collect::<Vec<_>>(),
            vec![Some(1.0), None, Some(3.0)]
        );
    }

    #[test]
    fn test_float_values_nan_is_missing() {
        let series = Series::new("v".into(), &[1.0, f64::NAN, 3.0]);
        assert_eq!(float_values(&series).unwrap().null_count(), 1);
    }

    #[test]
    fn test_text_values_from_numbers() {
        let series = Series::new("v".into(), &[Some(7i64), None]);
        assert_eq!(
            text_values(&series).unwrap(),
            vec![Some("7".to_string()), None]
        );
    }

    #[test]
    fn test_distinct_in_order() {
        let values = vec![
            Some("b".to_string()),
            None,
            Some("a".to_string()),
            Some("b".to_string()),
        ];
        assert_eq!(distinct_in_order(&values), vec!["b", "a"]);
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_numeric_nulls(&series, 0.0).unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }
}
