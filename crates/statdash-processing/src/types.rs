use crate::error::StatdashError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Summary entry holding the numeric describe table of a tabular dataset.
pub const NUMERICAL_STATISTICS: &str = "numerical_statistics";
/// Summary entry holding the top values of each categorical column.
pub const CATEGORICAL_STATISTICS: &str = "categorical_statistics";
/// Summary entry holding the sex × time cross-tabulation of a survey.
pub const GENDER_TIME: &str = "gender_time";
/// Summary entry holding the describe table over survey habit columns.
pub const HABIT_SUMMARY: &str = "habit_summary";

/// Column names partitioned by value type.
///
/// `numeric` and `categorical` are disjoint and together cover every column.
/// `datetime_like` is a subset of `categorical`. Names keep table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub datetime_like: Vec<String>,
}

impl ColumnClassification {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|c| c == column)
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.iter().any(|c| c == column)
    }

    pub fn is_datetime_like(&self, column: &str) -> bool {
        self.datetime_like.iter().any(|c| c == column)
    }
}

/// Outlier detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Flag values outside `[Q1 - k·IQR, Q3 + k·IQR]`
    #[default]
    Iqr,
    /// Flag values whose absolute standard score exceeds the threshold
    Zscore,
}

impl OutlierMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutlierMethod::Iqr => "iqr",
            OutlierMethod::Zscore => "zscore",
        }
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutlierMethod {
    type Err = StatdashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iqr" => Ok(OutlierMethod::Iqr),
            "zscore" => Ok(OutlierMethod::Zscore),
            _ => Err(StatdashError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Per-row outlier flags for one numeric column, aligned with the table rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierMask {
    pub column: String,
    pub method: OutlierMethod,
    pub flags: Vec<bool>,
}

impl OutlierMask {
    /// Number of flagged rows.
    pub fn outlier_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// Row indices of flagged values.
    pub fn indices(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Descriptive statistics of one numeric column.
///
/// Everything except `count` is `None` when the column has no values;
/// `std` also needs at least two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Describe table: one [`DescriptiveStats`] per column, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribeTable {
    pub columns: Vec<DescriptiveStats>,
}

impl DescribeTable {
    pub fn get(&self, column: &str) -> Option<&DescriptiveStats> {
        self.columns.iter().find(|s| s.column == column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A distinct value and how many rows hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Most frequent values of one categorical column.
///
/// `ranks` always has one slot per requested rank; slots past the number of
/// distinct values are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopValues {
    pub column: String,
    pub ranks: Vec<Option<ValueCount>>,
}

impl TopValues {
    /// The filled ranks, most frequent first.
    pub fn present(&self) -> impl Iterator<Item = &ValueCount> {
        self.ranks.iter().flatten()
    }
}

/// Top-N values for every categorical column, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopValuesTable {
    pub top_n: usize,
    pub columns: Vec<TopValues>,
}

impl TopValuesTable {
    pub fn get(&self, column: &str) -> Option<&TopValues> {
        self.columns.iter().find(|t| t.column == column)
    }
}

/// Row counts for every (row label, column label) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossTab {
    pub row_field: String,
    pub column_field: String,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `counts[r][c]` is the number of rows with `rows[r]` and `columns[c]`.
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn get(&self, row: &str, column: &str) -> Option<usize> {
        let r = self.rows.iter().position(|v| v == row)?;
        let c = self.columns.iter().position(|v| v == column)?;
        Some(self.counts[r][c])
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

/// One tabular entry of a [`SummaryResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryTable {
    Describe(DescribeTable),
    TopValues(TopValuesTable),
    CrossTab(CrossTab),
}

/// Named summary tables, recomputed on every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryResult {
    tables: BTreeMap<String, SummaryTable>,
}

impl SummaryResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, table: SummaryTable) {
        self.tables.insert(name.into(), table);
    }

    pub fn get(&self, name: &str) -> Option<&SummaryTable> {
        self.tables.get(name)
    }

    pub fn describe(&self, name: &str) -> Option<&DescribeTable> {
        match self.tables.get(name)? {
            SummaryTable::Describe(t) => Some(t),
            _ => None,
        }
    }

    pub fn top_values(&self, name: &str) -> Option<&TopValuesTable> {
        match self.tables.get(name)? {
            SummaryTable::TopValues(t) => Some(t),
            _ => None,
        }
    }

    pub fn cross_tab(&self, name: &str) -> Option<&CrossTab> {
        match self.tables.get(name)? {
            SummaryTable::CrossTab(t) => Some(t),
            _ => None,
        }
    }

    /// Entry names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SummaryTable)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Categories found in the reference source of a survey.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInventory {
    pub time_periods: Vec<String>,
    pub terms: Vec<String>,
    pub habits: Vec<String>,
}
