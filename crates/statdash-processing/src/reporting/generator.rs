use crate::error::Result;
use crate::pipeline::{MultiSourceSurveyProcessor, TabularDatasetProcessor};
use crate::types::{
    CategoryInventory, ColumnClassification, CrossTab, DescribeTable, OutlierMask, SummaryResult,
    SummaryTable, TopValuesTable,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Everything one pipeline run produced for a dataset.
///
/// Used for both JSON output (`--json`) and file writing (`--emit-report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Dataset label (`companies`, `sleep`)
    pub dataset: String,
    /// Input files, keyed by logical name
    pub inputs: BTreeMap<String, String>,
    /// Rows in the processed or integrated table
    pub rows: usize,
    /// Columns in the processed or integrated table
    pub columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ColumnClassification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoryInventory>,
    pub summary: SummaryResult,
    /// Flagged row count per column
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outliers: BTreeMap<String, usize>,
    /// Cleaning notes from the processor
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub processing_steps: Vec<String>,
}

impl DatasetReport {
    fn new(dataset: &str, summary: SummaryResult) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            dataset: dataset.to_string(),
            inputs: BTreeMap::new(),
            rows: 0,
            columns: 0,
            classification: None,
            categories: None,
            summary,
            outliers: BTreeMap::new(),
            processing_steps: Vec::new(),
        }
    }

    /// Report for a processed tabular dataset.
    pub fn from_tabular(
        dataset: &str,
        input: &Path,
        processor: &TabularDatasetProcessor,
        summary: SummaryResult,
        masks: &[OutlierMask],
    ) -> Self {
        let mut report = Self::new(dataset, summary);
        report
            .inputs
            .insert(dataset.to_string(), input.display().to_string());
        if let Some(df) = processor.processed() {
            report.rows = df.height();
            report.columns = df.width();
        }
        report.classification = processor.classification().cloned();
        report.outliers = masks
            .iter()
            .map(|m| (m.column.clone(), m.outlier_count()))
            .collect();
        report.processing_steps = processor.processing_steps().to_vec();
        report
    }

    /// Report for an integrated survey.
    pub fn from_survey(
        dataset: &str,
        processor: &MultiSourceSurveyProcessor,
        summary: SummaryResult,
    ) -> Self {
        let mut report = Self::new(dataset, summary);
        report.inputs = processor
            .config()
            .sources
            .iter()
            .map(|s| (s.name.clone(), s.path.display().to_string()))
            .collect();
        if let Some(df) = processor.integrated() {
            report.rows = df.height();
            report.columns = df.width();
        }
        report.categories = processor.categories().cloned();
        report
    }
}

// ============================================================================
// Report Generator
// ============================================================================

/// Renders reports as text or JSON and writes them to disk.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Pretty JSON rendering of a report.
    pub fn render_json(report: &DatasetReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Plain-text rendering of a report.
    pub fn render_text(report: &DatasetReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {} ===", report.dataset);
        let _ = writeln!(out, "Generated: {}", report.generated_at);
        for (name, path) in &report.inputs {
            let _ = writeln!(out, "Input {}: {}", name, path);
        }
        let _ = writeln!(out, "Shape: {} rows x {} columns", report.rows, report.columns);

        if let Some(classification) = &report.classification {
            let _ = writeln!(out, "\nNumeric columns: {}", classification.numeric.join(", "));
            let _ = writeln!(
                out,
                "Categorical columns: {}",
                classification.categorical.join(", ")
            );
            if !classification.datetime_like.is_empty() {
                let _ = writeln!(
                    out,
                    "Datetime-like columns: {}",
                    classification.datetime_like.join(", ")
                );
            }
        }

        if let Some(categories) = &report.categories {
            let _ = writeln!(out, "\nTime periods: {}", categories.time_periods.join(", "));
            let _ = writeln!(out, "Terms: {}", categories.terms.join(", "));
            let _ = writeln!(out, "Habits: {}", categories.habits.join(", "));
        }

        for (name, table) in report.summary.iter() {
            let _ = writeln!(out, "\n--- {} ---", name);
            match table {
                SummaryTable::Describe(t) => render_describe(&mut out, t),
                SummaryTable::TopValues(t) => render_top_values(&mut out, t),
                SummaryTable::CrossTab(t) => render_cross_tab(&mut out, t),
            }
        }

        if !report.outliers.is_empty() {
            let _ = writeln!(out, "\n--- outliers ---");
            for (column, count) in &report.outliers {
                let _ = writeln!(out, "{:<24} {}", column, count);
            }
        }

        out
    }

    /// Write a report as `<base_name>_report.json` in the output directory.
    pub fn write_report_to_file(&self, report: &DatasetReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(Self::render_json(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{:.2}", v))
}

fn render_describe(out: &mut String, table: &DescribeTable) {
    let _ = writeln!(
        out,
        "{:<24} {:>8} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for s in &table.columns {
        let _ = writeln!(
            out,
            "{:<24} {:>8} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
            s.column,
            s.count,
            fmt_opt(s.mean),
            fmt_opt(s.std),
            fmt_opt(s.min),
            fmt_opt(s.q25),
            fmt_opt(s.median),
            fmt_opt(s.q75),
            fmt_opt(s.max)
        );
    }
}

fn render_top_values(out: &mut String, table: &TopValuesTable) {
    for top in &table.columns {
        let ranked: Vec<String> = top
            .ranks
            .iter()
            .map(|rank| match rank {
                Some(vc) => format!("{} ({})", vc.value, vc.count),
                None => "-".to_string(),
            })
            .collect();
        let _ = writeln!(out, "{:<24} {}", top.column, ranked.join(" | "));
    }
}

fn render_cross_tab(out: &mut String, table: &CrossTab) {
    let _ = write!(out, "{:<12}", format!("{}\\{}", table.row_field, table.column_field));
    for column in &table.columns {
        let _ = write!(out, " {:>12}", column);
    }
    let _ = writeln!(out);
    for (row, counts) in table.rows.iter().zip(&table.counts) {
        let _ = write!(out, "{:<12}", row);
        for count in counts {
            let _ = write!(out, " {:>12}", count);
        }
        let _ = writeln!(out);
    }
}
