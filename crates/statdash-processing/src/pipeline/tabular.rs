//! Single-table processor.
//!
//! Drives one CSV through load → classify → clean → summarize, with outlier
//! detection available once the table is clean. Each step checks that the
//! previous one has run and fails with a sequencing error otherwise.

use crate::cleaner::{DataCleaner, TextParsing};
use crate::config::TabularConfig;
use crate::error::{Result, StatdashError};
use crate::imputers::StatisticalImputer;
use crate::loader::read_csv;
use crate::pipeline::outliers::OutlierDetector;
use crate::profiler::DataProfiler;
use crate::types::{
    CATEGORICAL_STATISTICS, ColumnClassification, NUMERICAL_STATISTICS, OutlierMask,
    OutlierMethod, SummaryResult, SummaryTable,
};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Processor for a single tabular dataset such as the companies file.
///
/// # Example
///
/// ```rust,no_run
/// use statdash_processing::{OutlierMethod, TabularConfig, TabularDatasetProcessor};
///
/// # fn main() -> statdash_processing::Result<()> {
/// let mut processor = TabularDatasetProcessor::new(TabularConfig::default());
/// processor.load("data/Top_1000_Companies_Dataset.csv")?;
/// processor.classify_columns()?;
/// processor.clean_numeric()?;
///
/// let summary = processor.summary_statistics()?;
/// let masks = processor.detect_outliers(None, OutlierMethod::Iqr)?;
/// # Ok(())
/// # }
/// ```
pub struct TabularDatasetProcessor {
    config: TabularConfig,
    raw: Option<DataFrame>,
    classification: Option<ColumnClassification>,
    processed: Option<DataFrame>,
    processing_steps: Vec<String>,
}

impl TabularDatasetProcessor {
    pub fn new(config: TabularConfig) -> Self {
        Self {
            config,
            raw: None,
            classification: None,
            processed: None,
            processing_steps: Vec::new(),
        }
    }

    /// Create a processor around an already-loaded table.
    pub fn from_frame(config: TabularConfig, df: DataFrame) -> Self {
        let mut processor = Self::new(config);
        processor.raw = Some(df);
        processor
    }

    pub fn config(&self) -> &TabularConfig {
        &self.config
    }

    /// Read a CSV file, replacing any previously loaded table.
    ///
    /// Classification and processed state from an earlier load are dropped.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<&DataFrame> {
        let df = read_csv(path.as_ref(), self.config.infer_schema_length)?;

        self.classification = None;
        self.processed = None;
        self.processing_steps.clear();

        Ok(&*self.raw.insert(df))
    }

    /// Partition the loaded columns into numeric, categorical and
    /// datetime-like names. The result is also kept for later steps.
    pub fn classify_columns(&mut self) -> Result<ColumnClassification> {
        let raw = self.raw.as_ref().ok_or(StatdashError::NotLoaded)?;
        let classification = DataProfiler::classify_columns(raw, &self.config);

        info!(
            "Classified columns: {} numeric, {} categorical",
            classification.numeric.len(),
            classification.categorical.len()
        );

        self.classification = Some(classification.clone());
        Ok(classification)
    }

    /// Build the processed table from the raw one.
    ///
    /// Numeric columns are converted to Float64 (text cells go through
    /// financial-string normalization) and their missing cells are filled
    /// with the column median. The processed table is always rebuilt from
    /// the raw table, so repeated calls give the same result.
    pub fn clean_numeric(&mut self) -> Result<&DataFrame> {
        let raw = self.raw.as_ref().ok_or(StatdashError::NotLoaded)?;
        let classification = self
            .classification
            .as_ref()
            .ok_or(StatdashError::NotClassified)?;

        let mut df = raw.clone();
        let mut steps = Vec::new();

        let unparsed =
            DataCleaner::normalize_numeric(&mut df, &classification.numeric, TextParsing::Financial)?;
        if unparsed > 0 {
            steps.push(format!(
                "{} numeric cells could not be parsed and were treated as missing",
                unparsed
            ));
        }

        for column in &classification.numeric {
            StatisticalImputer::apply_numeric_median(&mut df, column, &mut steps)?;
        }

        debug!("clean_numeric finished with {} steps", steps.len());
        info!("Processed table ready: {:?}", df.shape());

        self.processing_steps = steps;
        Ok(&*self.processed.insert(df))
    }

    /// Describe table for numeric columns and top values for categorical
    /// columns, recomputed on every call.
    pub fn summary_statistics(&self) -> Result<SummaryResult> {
        let (df, classification) = self.processed_state()?;

        let mut summary = SummaryResult::new();
        summary.insert(
            NUMERICAL_STATISTICS,
            SummaryTable::Describe(DataProfiler::describe(df, &classification.numeric)?),
        );
        summary.insert(
            CATEGORICAL_STATISTICS,
            SummaryTable::TopValues(DataProfiler::top_values(
                df,
                &classification.categorical,
                self.config.top_values,
            )?),
        );

        Ok(summary)
    }

    /// One outlier mask per requested column; all numeric columns when
    /// `columns` is `None`.
    pub fn detect_outliers(
        &self,
        columns: Option<&[&str]>,
        method: OutlierMethod,
    ) -> Result<Vec<OutlierMask>> {
        let (df, classification) = self.processed_state()?;
        let detector = OutlierDetector::from_config(&self.config);

        let requested: Vec<&str> = match columns {
            Some(columns) => columns.to_vec(),
            None => classification.numeric.iter().map(String::as_str).collect(),
        };

        requested
            .into_iter()
            .map(|column| detector.detect(df, column, method))
            .collect()
    }

    /// Like [`detect_outliers`](Self::detect_outliers) with the method given
    /// by name (`"iqr"` or `"zscore"`).
    pub fn detect_outliers_named(
        &self,
        columns: Option<&[&str]>,
        method: &str,
    ) -> Result<Vec<OutlierMask>> {
        let method = method.parse::<OutlierMethod>()?;
        self.detect_outliers(columns, method)
    }

    /// First `n` rows of the processed table.
    pub fn preview(&self, n: usize) -> Result<DataFrame> {
        let (df, _) = self.processed_state()?;
        Ok(df.head(Some(n)))
    }

    pub fn raw(&self) -> Option<&DataFrame> {
        self.raw.as_ref()
    }

    pub fn processed(&self) -> Option<&DataFrame> {
        self.processed.as_ref()
    }

    pub fn classification(&self) -> Option<&ColumnClassification> {
        self.classification.as_ref()
    }

    /// Notes recorded by the last `clean_numeric` run.
    pub fn processing_steps(&self) -> &[String] {
        &self.processing_steps
    }

    fn processed_state(&self) -> Result<(&DataFrame, &ColumnClassification)> {
        match (&self.processed, &self.classification) {
            (Some(df), Some(classification)) => Ok((df, classification)),
            _ => Err(StatdashError::NotProcessed),
        }
    }
}
