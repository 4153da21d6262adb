//! Column statistics: describe tables, top values and cross-tabulations.

use crate::types::{CrossTab, DescriptiveStats, TopValues, ValueCount};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// Quantile of the non-missing values, interpolating linearly between the
/// closest ranks.
pub(crate) fn quantile(values: &Float64Chunked, q: f64) -> PolarsResult<Option<f64>> {
    values.quantile(q, QuantileMethod::Linear)
}

/// Descriptive statistics over the non-missing values of a column.
///
/// `std` is the sample deviation and needs at least two values.
pub(crate) fn describe(column: &str, values: &Float64Chunked) -> PolarsResult<DescriptiveStats> {
    let count = values.len() - values.null_count();

    Ok(DescriptiveStats {
        column: column.to_string(),
        count,
        mean: values.mean(),
        std: if count > 1 { values.std(1) } else { None },
        min: values.min(),
        q25: quantile(values, 0.25)?,
        median: values.median(),
        q75: quantile(values, 0.75)?,
        max: values.max(),
    })
}

/// The `n` most frequent values of a column, rendered as text.
///
/// Ties on count keep first-appearance order. Missing cells are not counted.
pub(crate) fn top_values(column: &str, series: &Series, n: usize) -> PolarsResult<TopValues> {
    let text = series.cast(&DataType::String)?.with_name("value".into());
    let counted = text
        .drop_nulls()
        .value_counts(false, false, "count".into(), false)?;

    let cells = text.str()?;
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (idx, value) in cells.into_iter().enumerate() {
        if let Some(value) = value {
            first_seen.entry(value).or_insert(idx);
        }
    }

    let values = counted.column("value")?.as_materialized_series().str()?;
    let counts = counted
        .column("count")?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;
    let counts = counts.u64()?;

    let mut ordered: Vec<(&str, usize, usize)> = values
        .into_iter()
        .zip(counts)
        .filter_map(|(value, count)| {
            let value = value?;
            let first = first_seen.get(value).copied().unwrap_or(usize::MAX);
            Some((value, count? as usize, first))
        })
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let mut ranks: Vec<Option<ValueCount>> = ordered
        .into_iter()
        .take(n)
        .map(|(value, count, _)| {
            Some(ValueCount {
                value: value.to_string(),
                count,
            })
        })
        .collect();
    ranks.resize(n, None);

    Ok(TopValues {
        column: column.to_string(),
        ranks,
    })
}

/// Count rows for every (row, column) label pair.
///
/// Labels are sorted; rows missing either label are skipped.
pub(crate) fn cross_tabulate(
    row_field: &str,
    row_labels: &[Option<String>],
    column_field: &str,
    column_labels: &[Option<String>],
) -> CrossTab {
    let pairs: Vec<(&str, &str)> = row_labels
        .iter()
        .zip(column_labels)
        .filter_map(|(r, c)| Some((r.as_deref()?, c.as_deref()?)))
        .collect();

    let rows: Vec<String> = pairs
        .iter()
        .map(|(r, _)| *r)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let columns: Vec<String> = pairs
        .iter()
        .map(|(_, c)| *c)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut counts = vec![vec![0usize; columns.len()]; rows.len()];
    for (r, c) in pairs {
        // Both labels came from these sets, so the searches always succeed.
        if let (Ok(ri), Ok(ci)) = (
            rows.binary_search_by(|v| v.as_str().cmp(r)),
            columns.binary_search_by(|v| v.as_str().cmp(c)),
        ) {
            counts[ri][ci] += 1;
        }
    }

    CrossTab {
        row_field: row_field.to_string(),
        column_field: column_field.to_string(),
        rows,
        columns,
        counts,
    }
}
