//! Multi-source survey processor.
//!
//! Loads several survey files that share identity columns, records the
//! categories found in a reference source, and stacks every source into one
//! integrated table tagged with where each row came from.

use crate::cleaner::{DataCleaner, TextParsing};
use crate::config::SurveyConfig;
use crate::error::{Result, StatdashError};
use crate::loader::read_csv_as_text;
use crate::profiler::DataProfiler;
use crate::types::{CategoryInventory, GENDER_TIME, HABIT_SUMMARY, SummaryResult, SummaryTable};
use crate::utils::distinct_in_order;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Processor for a family of survey files integrated into one table.
pub struct MultiSourceSurveyProcessor {
    config: SurveyConfig,
    raw: HashMap<String, DataFrame>,
    categories: Option<CategoryInventory>,
    integrated: Option<DataFrame>,
}

impl MultiSourceSurveyProcessor {
    pub fn new(config: SurveyConfig) -> Self {
        Self {
            config,
            raw: HashMap::new(),
            categories: None,
            integrated: None,
        }
    }

    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }

    /// Load every configured source, then derive the category inventory.
    ///
    /// Either every source is loaded or none is: on any failure the
    /// processor is left with no loaded sources.
    pub fn load_all(&mut self) -> Result<()> {
        self.raw.clear();
        self.categories = None;
        self.integrated = None;

        let mut staged = HashMap::with_capacity(self.config.sources.len());
        for source in &self.config.sources {
            match read_csv_as_text(&source.path) {
                Ok(df) => {
                    debug!("Loaded source '{}': {:?}", source.name, df.shape());
                    staged.insert(source.name.clone(), df);
                }
                Err(e) => {
                    error!("Error reading {} file: {}", source.name, e);
                    return Err(StatdashError::SourceLoad {
                        name: source.name.clone(),
                        cause: Box::new(e),
                    });
                }
            }
        }

        self.raw = staged;
        info!("Loaded {} survey sources", self.raw.len());

        if !self.config.sources.is_empty()
            && let Err(e) = self.derive_categories().map(|_| ())
        {
            self.raw.clear();
            return Err(e);
        }

        Ok(())
    }

    /// Record time periods, terms and habit names from the reference source.
    pub fn derive_categories(&mut self) -> Result<&CategoryInventory> {
        let reference = &self.config.reference_source;
        let df = self
            .raw
            .get(reference)
            .ok_or_else(|| StatdashError::MissingReference(reference.clone()))?;

        let time_periods =
            distinct_in_order(&DataProfiler::column_text(df, &self.config.time_column)?);
        let terms = distinct_in_order(&DataProfiler::column_text(df, &self.config.terms_column)?);
        let habits: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| !self.config.is_identity_column(name))
            .collect();

        debug!(
            "Reference '{}': {} time periods, {} terms, {} habits",
            reference,
            time_periods.len(),
            terms.len(),
            habits.len()
        );

        Ok(&*self.categories.insert(CategoryInventory {
            time_periods,
            terms,
            habits,
        }))
    }

    /// Stack every source into one table with a source tag column.
    ///
    /// Columns are the union across sources in first-seen order; a source
    /// without a column gets missing cells for it. Identity columns are
    /// text, every other column is Float64 with unparseable cells missing.
    pub fn integrate(&mut self) -> Result<&DataFrame> {
        if self.config.sources.is_empty() {
            return Err(StatdashError::NoValidSources);
        }

        let mut frames = Vec::with_capacity(self.config.sources.len());
        for source in &self.config.sources {
            let df = self.raw.get(&source.name).ok_or(StatdashError::NotLoaded)?;
            frames.push(self.tagged(&source.name, df)?);
        }

        let union = union_columns(&frames);
        let mut integrated: Option<DataFrame> = None;
        for frame in frames {
            let aligned = self.align(frame, &union)?;
            match integrated.as_mut() {
                Some(acc) => {
                    acc.vstack_mut(&aligned)?;
                }
                None => integrated = Some(aligned),
            }
        }

        let integrated = integrated.ok_or(StatdashError::NoValidSources)?;
        info!("Integrated table: {:?}", integrated.shape());

        Ok(&*self.integrated.insert(integrated))
    }

    /// Cross-tabulation of sex by time and a describe table over habits.
    pub fn summary_statistics(&self) -> Result<SummaryResult> {
        let df = self.integrated.as_ref().ok_or(StatdashError::NotIntegrated)?;

        let habits: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| !self.config.is_identity_column(name))
            .collect();

        let mut summary = SummaryResult::new();
        summary.insert(
            GENDER_TIME,
            SummaryTable::CrossTab(DataProfiler::cross_tab(
                df,
                &self.config.sex_column,
                &self.config.time_column,
            )?),
        );
        summary.insert(
            HABIT_SUMMARY,
            SummaryTable::Describe(DataProfiler::describe(df, &habits)?),
        );

        Ok(summary)
    }

    /// First `n` rows of the integrated table.
    pub fn preview(&self, n: usize) -> Result<DataFrame> {
        let df = self.integrated.as_ref().ok_or(StatdashError::NotIntegrated)?;
        Ok(df.head(Some(n)))
    }

    /// The loaded table of one source.
    pub fn raw(&self, name: &str) -> Option<&DataFrame> {
        self.raw.get(name)
    }

    pub fn integrated(&self) -> Option<&DataFrame> {
        self.integrated.as_ref()
    }

    pub fn categories(&self) -> Option<&CategoryInventory> {
        self.categories.as_ref()
    }

    /// Copy of a source table with the source tag appended and every column
    /// converted to its integrated type.
    fn tagged(&self, name: &str, df: &DataFrame) -> Result<DataFrame> {
        let mut frame = df.clone();
        let tag = Series::new(
            self.config.source_column.as_str().into(),
            vec![name; frame.height()],
        );
        frame.with_column(tag)?;

        let (identity, measures): (Vec<String>, Vec<String>) = frame
            .get_column_names()
            .into_iter()
            .map(|c| c.to_string())
            .partition(|c| self.config.is_identity_column(c));

        DataCleaner::normalize_text(&mut frame, &identity)?;
        let unparsed = DataCleaner::normalize_numeric(&mut frame, &measures, TextParsing::Plain)?;
        if unparsed > 0 {
            debug!("Source '{}': {} cells coerced to missing", name, unparsed);
        }

        Ok(frame)
    }

    /// Reorder `frame` to `union`, adding all-missing columns it lacks.
    fn align(&self, mut frame: DataFrame, union: &[String]) -> Result<DataFrame> {
        let height = frame.height();
        for name in union {
            if frame.column(name).is_err() {
                let dtype = if self.config.is_identity_column(name) {
                    DataType::String
                } else {
                    DataType::Float64
                };
                frame.with_column(Series::full_null(name.as_str().into(), height, &dtype))?;
            }
        }
        Ok(frame.select(union.iter().map(String::as_str))?)
    }
}

/// Column names across frames in first-seen order.
fn union_columns(frames: &[DataFrame]) -> Vec<String> {
    let mut union: Vec<String> = Vec::new();
    for frame in frames {
        for name in frame.get_column_names() {
            if !union.iter().any(|u| u == name.as_str()) {
                union.push(name.to_string());
            }
        }
    }
    union
}
