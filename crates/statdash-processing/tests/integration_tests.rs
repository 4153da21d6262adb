//! Integration tests for the dashboard processors.
//!
//! These tests verify end-to-end behavior using the CSV fixtures and
//! generated survey files.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use statdash_processing::cleaner::{DataCleaner, TextParsing};
use statdash_processing::config::{ColumnKind, SLEEP_FILE_NAMES};
use statdash_processing::types::{
    CATEGORICAL_STATISTICS, GENDER_TIME, HABIT_SUMMARY, NUMERICAL_STATISTICS,
};
use statdash_processing::{
    DashboardConfig, DatasetReport, MultiSourceSurveyProcessor, OutlierMethod, ReportGenerator,
    StatdashError, SurveyConfig, TabularConfig, TabularDatasetProcessor,
};
use std::path::{Path, PathBuf};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn companies_config() -> TabularConfig {
    TabularConfig::builder()
        .column_kind("Revenue", ColumnKind::Numeric)
        .build()
        .unwrap()
}

fn processed_companies(config: TabularConfig) -> TabularDatasetProcessor {
    let mut processor = TabularDatasetProcessor::new(config);
    processor
        .load(fixtures_path().join("companies.csv"))
        .unwrap();
    processor.classify_columns().unwrap();
    processor.clean_numeric().unwrap();
    processor
}

fn fixture_survey() -> SurveyConfig {
    let fixtures = fixtures_path();
    SurveyConfig::builder()
        .source("bedtime", fixtures.join("bedtime.csv"))
        .source("wake_up", fixtures.join("wake_up.csv"))
        .source("sleeping_time", fixtures.join("sleeping_time.csv"))
        .build()
        .unwrap()
}

/// Write a survey file with `rows` generated respondents.
fn write_generated_survey(dir: &Path, file: &str, rows: usize) -> PathBuf {
    let mut content = String::from("sex,time,terms,hours,phone_use\n");
    for i in 0..rows {
        let sex = if i % 2 == 0 { "F" } else { "M" };
        let time = ["night", "late_night", "evening"][i % 3];
        let terms = if i % 5 < 3 { "weekday" } else { "weekend" };
        content.push_str(&format!("{},{},{},{},{}\n", sex, time, terms, 5 + i % 4, i % 6));
    }
    let path = dir.join(file);
    std::fs::write(&path, content).unwrap();
    path
}

fn floats(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

// ============================================================================
// Tabular Processor Tests
// ============================================================================

#[test]
fn test_companies_classification() {
    let mut processor = TabularDatasetProcessor::new(TabularConfig::default());
    let raw = processor
        .load(fixtures_path().join("companies.csv"))
        .unwrap();
    assert_eq!(raw.shape(), (12, 7));

    let classification = processor.classify_columns().unwrap();
    assert_eq!(classification.numeric, vec!["Employees", "Rating"]);
    assert_eq!(
        classification.categorical,
        vec!["Company", "Country", "Industry", "Revenue", "Founded"]
    );
    assert_eq!(classification.datetime_like, vec!["Founded"]);
}

#[test]
fn test_classify_columns_is_idempotent() {
    let mut processor = TabularDatasetProcessor::new(TabularConfig::default());
    processor
        .load(fixtures_path().join("companies.csv"))
        .unwrap();

    let first = processor.classify_columns().unwrap();
    let second = processor.classify_columns().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_founded_column_is_datetime_like_in_any_case() {
    let df = df![
        "YEAR_FOUNDED" => ["1990", "2001"],
        "founded_in" => ["Ohio", "Texas"],
        "Value" => [1.0, 2.0],
    ]
    .unwrap();
    let mut processor = TabularDatasetProcessor::from_frame(TabularConfig::default(), df);
    let classification = processor.classify_columns().unwrap();

    assert_eq!(classification.datetime_like, vec!["YEAR_FOUNDED", "founded_in"]);
    assert!(!classification.is_datetime_like("Value"));
}

#[test]
fn test_clean_numeric_leaves_no_missing_values() {
    let processor = processed_companies(companies_config());
    let df = processor.processed().unwrap();

    for column in &processor.classification().unwrap().numeric {
        let series = df.column(column).unwrap();
        assert_eq!(series.dtype(), &DataType::Float64, "{column}");
        assert_eq!(series.null_count(), 0, "{column}");
    }
}

#[test]
fn test_clean_numeric_values() {
    let processor = processed_companies(companies_config());
    let df = processor.processed().unwrap();

    let revenue = floats(df, "Revenue");
    assert_eq!(revenue[0], Some(1.2e9));
    assert_eq!(revenue[5], Some(5e5));
    assert_eq!(revenue[7], Some(1.25e10));
    // "N/A" filled with the median of the eleven parsed values
    assert_eq!(revenue[6], Some(8.5e8));

    // Median of the ten present head counts is (3400 + 6100) / 2
    let employees = floats(df, "Employees");
    assert_eq!(employees[1], Some(4750.0));
    assert_eq!(employees[8], Some(4750.0));
}

#[test]
fn test_clean_numeric_is_idempotent() {
    let mut processor = processed_companies(companies_config());
    let first = processor.processed().unwrap().clone();

    processor.clean_numeric().unwrap();
    let second = processor.processed().unwrap();

    assert!(first.equals_missing(second));
}

#[test]
fn test_clean_numeric_on_processed_table_is_noop() {
    let processor = processed_companies(companies_config());
    let processed = processor.processed().unwrap();

    let mut again = TabularDatasetProcessor::from_frame(companies_config(), processed.clone());
    let classification = again.classify_columns().unwrap();
    assert_eq!(&classification, processor.classification().unwrap());

    let recleaned = again.clean_numeric().unwrap();
    assert!(recleaned.equals_missing(processed));
    assert!(again.processing_steps().is_empty());
}

#[test]
fn test_long_file_with_null_tokens() {
    let mut processor = TabularDatasetProcessor::new(TabularConfig::default());
    let raw = processor
        .load(fixtures_path().join("companies_long.csv"))
        .unwrap();
    assert_eq!(raw.shape(), (130, 6));
    assert_eq!(raw.column("Employees").unwrap().null_count(), 2);

    // "NA"/"N/A"/"NaN" are missing cells; "T110" after row 100 is text
    let classification = processor.classify_columns().unwrap();
    assert_eq!(classification.numeric, vec!["Employees", "Rating"]);
    assert_eq!(
        classification.categorical,
        vec!["Company", "Country", "Revenue", "Ticker"]
    );

    let df = processor.clean_numeric().unwrap();
    let employees = floats(df, "Employees");
    assert_eq!(employees[40], Some(745.0));
    assert_eq!(employees[120], Some(745.0));
    assert_eq!(df.column("Rating").unwrap().null_count(), 0);

    let summary = processor.summary_statistics().unwrap();
    let numeric = summary.describe(NUMERICAL_STATISTICS).unwrap();
    assert_eq!(numeric.get("Employees").unwrap().count, 130);
}

#[test]
fn test_data_cleaner_public_api() {
    let mut df = df![
        "Revenue" => [Some("$1.2B"), Some("500K"), None, Some("soon")],
        "sex" => [1i64, 2, 1, 2],
    ]
    .unwrap();

    let lost = DataCleaner::normalize_numeric(&mut df, &["Revenue"], TextParsing::Financial).unwrap();
    assert_eq!(lost, 1);
    assert_eq!(floats(&df, "Revenue"), vec![Some(1.2e9), Some(5e5), None, None]);

    DataCleaner::normalize_text(&mut df, &["sex"]).unwrap();
    assert_eq!(df.column("sex").unwrap().dtype(), &DataType::String);
}

#[test]
fn test_companies_summary_statistics() {
    let processor = processed_companies(TabularConfig::default());
    let summary = processor.summary_statistics().unwrap();

    let numeric = summary.describe(NUMERICAL_STATISTICS).unwrap();
    let rating = numeric.get("Rating").unwrap();
    assert_eq!(rating.count, 12);
    assert_eq!(rating.max, Some(4.8));
    assert_eq!(rating.min, Some(2.7));

    let categorical = summary.top_values(CATEGORICAL_STATISTICS).unwrap();
    let country: Vec<(String, usize)> = categorical
        .get("Country")
        .unwrap()
        .present()
        .map(|vc| (vc.value.clone(), vc.count))
        .collect();
    assert_eq!(
        country,
        vec![
            ("USA".to_string(), 8),
            ("Japan".to_string(), 2),
            ("UK".to_string(), 1),
            ("China".to_string(), 1),
        ]
    );
    assert!(categorical.get("Country").unwrap().ranks[4].is_none());
}

#[test]
fn test_iqr_fences_from_quartiles() {
    // Q1 = 10, Q3 = 20 -> values below -5 or above 35 are outliers
    let df = df![
        "score" => [-6.0, 10.0, 10.0, 15.0, 15.0, 20.0, 20.0, 35.0, 36.0],
    ]
    .unwrap();
    let mut processor = TabularDatasetProcessor::from_frame(TabularConfig::default(), df);
    processor.classify_columns().unwrap();
    processor.clean_numeric().unwrap();

    let masks = processor
        .detect_outliers_named(Some(&["score"]), "iqr")
        .unwrap();
    assert_eq!(masks.len(), 1);
    assert_eq!(masks[0].indices(), vec![0, 8]);
}

#[test]
fn test_unknown_outlier_method_always_fails() {
    let processor = processed_companies(TabularConfig::default());

    for method in ["unknown", "", "iqr2", "z-score"] {
        let err = processor.detect_outliers_named(None, method).unwrap_err();
        assert!(
            matches!(err, StatdashError::UnsupportedMethod(_)),
            "{method}: {err}"
        );
    }
}

#[test]
fn test_outlier_masks_align_with_rows() {
    let processor = processed_companies(companies_config());
    let masks = processor
        .detect_outliers(None, OutlierMethod::Zscore)
        .unwrap();

    assert_eq!(masks.len(), 3);
    for mask in &masks {
        assert_eq!(mask.len(), 12);
    }
}

#[test]
fn test_tabular_sequencing_errors() {
    let mut processor = TabularDatasetProcessor::new(TabularConfig::default());

    assert!(matches!(
        processor.summary_statistics(),
        Err(StatdashError::NotProcessed)
    ));
    assert!(matches!(
        processor.classify_columns(),
        Err(StatdashError::NotLoaded)
    ));
    assert!(matches!(processor.preview(10), Err(StatdashError::NotProcessed)));
}

#[test]
fn test_load_missing_file() {
    let mut processor = TabularDatasetProcessor::new(TabularConfig::default());
    let err = processor
        .load(fixtures_path().join("no_such_file.csv"))
        .unwrap_err();

    assert_eq!(err.error_code(), "LOAD_ERROR");
    assert!(processor.raw().is_none());
}

// ============================================================================
// Survey Processor Tests
// ============================================================================

#[test]
fn test_survey_categories_from_reference() {
    let mut processor = MultiSourceSurveyProcessor::new(fixture_survey());
    processor.load_all().unwrap();

    let categories = processor.categories().unwrap();
    assert_eq!(categories.time_periods, vec!["night", "late_night", "evening"]);
    assert_eq!(categories.terms, vec!["weekday", "weekend"]);
    assert_eq!(categories.habits, vec!["phone_use", "caffeine", "exercise"]);
}

#[test]
fn test_survey_integration_from_fixtures() {
    let mut processor = MultiSourceSurveyProcessor::new(fixture_survey());
    processor.load_all().unwrap();
    let df = processor.integrate().unwrap();

    assert_eq!(df.height(), 13);
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "sex", "time", "terms", "phone_use", "caffeine", "exercise", "source", "alarm",
            "naps"
        ]
    );

    // "often" and "n/a" are coerced to missing; sleeping_time has no caffeine
    assert_eq!(df.column("caffeine").unwrap().null_count(), 2 + 3);
    assert_eq!(df.column("naps").unwrap().null_count(), 10);
}

#[test]
fn test_integration_of_generated_sources() {
    let dir = tempfile::tempdir().unwrap();
    let config = SurveyConfig::builder()
        .source("bedtime", write_generated_survey(dir.path(), "a.csv", 100))
        .source("wake_up", write_generated_survey(dir.path(), "b.csv", 150))
        .source("sleeping_time", write_generated_survey(dir.path(), "c.csv", 80))
        .build()
        .unwrap();

    let mut processor = MultiSourceSurveyProcessor::new(config);
    processor.load_all().unwrap();
    let df = processor.integrate().unwrap();

    assert_eq!(df.height(), 330);

    let source = df.column("source").unwrap().as_materialized_series().clone();
    assert_eq!(source.n_unique().unwrap(), 3);

    let tags: Vec<&str> = source.str().unwrap().into_no_null_iter().collect();
    assert!(tags[..100].iter().all(|t| *t == "bedtime"));
    assert!(tags[100..250].iter().all(|t| *t == "wake_up"));
    assert!(tags[250..].iter().all(|t| *t == "sleeping_time"));
}

#[test]
fn test_survey_late_text_and_null_tokens_become_missing() {
    let fixtures = fixtures_path();
    let config = SurveyConfig::builder()
        .source("bedtime", fixtures.join("bedtime_long.csv"))
        .source("wake_up", fixtures.join("wake_up.csv"))
        .build()
        .unwrap();
    let mut processor = MultiSourceSurveyProcessor::new(config);
    processor.load_all().unwrap();

    assert_eq!(processor.raw("bedtime").unwrap().height(), 130);
    let df = processor.integrate().unwrap();
    assert_eq!(df.height(), 134);

    // Row 115 answers "often", row 120 "NA"
    let phone_use = floats(df, "phone_use");
    assert_eq!(phone_use[115], None);
    assert_eq!(phone_use[114], Some(0.0));
    let hours = floats(df, "hours");
    assert_eq!(hours[120], None);
    assert_eq!(hours[121], Some(6.0));

    // wake_up has no hours column and one blank phone_use
    assert_eq!(df.column("hours").unwrap().null_count(), 1 + 4);
    assert_eq!(df.column("phone_use").unwrap().null_count(), 1 + 1);
}

#[test]
fn test_survey_summary_statistics() {
    let mut processor = MultiSourceSurveyProcessor::new(fixture_survey());
    processor.load_all().unwrap();
    processor.integrate().unwrap();

    let summary = processor.summary_statistics().unwrap();

    let gender_time = summary.cross_tab(GENDER_TIME).unwrap();
    assert_eq!(gender_time.rows, vec!["F", "M"]);
    assert_eq!(
        gender_time.columns,
        vec![
            "early_morning",
            "evening",
            "late_morning",
            "late_night",
            "morning",
            "night"
        ]
    );
    assert_eq!(gender_time.get("F", "night"), Some(3));
    assert_eq!(gender_time.get("F", "late_night"), Some(2));
    assert_eq!(gender_time.get("M", "evening"), Some(1));
    assert_eq!(gender_time.get("M", "morning"), Some(0));
    assert_eq!(gender_time.total(), 13);

    let habits = summary.describe(HABIT_SUMMARY).unwrap();
    let columns: Vec<&str> = habits.columns.iter().map(|s| s.column.as_str()).collect();
    assert_eq!(
        columns,
        vec!["phone_use", "caffeine", "exercise", "alarm", "naps"]
    );
    assert_eq!(habits.get("phone_use").unwrap().count, 12);
    assert_eq!(habits.get("naps").unwrap().count, 3);
}

#[test]
fn test_survey_sequencing_errors() {
    let mut processor = MultiSourceSurveyProcessor::new(fixture_survey());

    assert!(matches!(
        processor.summary_statistics(),
        Err(StatdashError::NotIntegrated)
    ));
    assert!(matches!(processor.integrate(), Err(StatdashError::NotLoaded)));
    assert!(matches!(
        processor.derive_categories(),
        Err(StatdashError::MissingReference(_))
    ));
    assert!(matches!(processor.preview(5), Err(StatdashError::NotIntegrated)));
}

#[test]
fn test_survey_load_failure_names_source() {
    let fixtures = fixtures_path();
    let config = SurveyConfig::builder()
        .source("bedtime", fixtures.join("bedtime.csv"))
        .source("wake_up", fixtures.join("missing_wake_up.csv"))
        .build()
        .unwrap();
    let mut processor = MultiSourceSurveyProcessor::new(config);

    let err = processor.load_all().unwrap_err();
    assert_eq!(err.failed_source(), Some("wake_up"));
    assert!(err.to_string().contains("wake_up"));
    assert!(processor.raw("bedtime").is_none());
    assert!(matches!(processor.integrate(), Err(StatdashError::NotLoaded)));
}

// ============================================================================
// Configuration & Reporting Tests
// ============================================================================

#[test]
fn test_dashboard_config_from_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let fixtures = fixtures_path();
    for ((_, file_name), fixture) in SLEEP_FILE_NAMES
        .iter()
        .zip(["bedtime.csv", "wake_up.csv", "sleeping_time.csv"])
    {
        std::fs::copy(fixtures.join(fixture), dir.path().join(file_name)).unwrap();
    }

    let config = DashboardConfig::from_data_dir(dir.path());
    let mut processor = MultiSourceSurveyProcessor::new(config.sleep);
    processor.load_all().unwrap();

    assert_eq!(processor.integrate().unwrap().height(), 13);
}

#[test]
fn test_dashboard_config_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statdash.json");
    std::fs::write(
        &path,
        r#"{
            "companies_file": "companies.csv",
            "companies": { "top_values": 3, "column_kinds": { "Revenue": "numeric" } }
        }"#,
    )
    .unwrap();

    let config = DashboardConfig::from_json_file(&path).unwrap();
    assert_eq!(config.companies.top_values, 3);
    assert_eq!(config.companies.iqr_factor, 1.5);
    assert_eq!(
        config.companies.column_kinds.get("Revenue"),
        Some(&ColumnKind::Numeric)
    );

    std::fs::write(&path, r#"{ "companies": { "top_values": 0 } }"#).unwrap();
    let err = DashboardConfig::from_json_file(&path).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CONFIG");
}

#[test]
fn test_survey_report_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut processor = MultiSourceSurveyProcessor::new(fixture_survey());
    processor.load_all().unwrap();
    processor.integrate().unwrap();

    let report =
        DatasetReport::from_survey("sleep", &processor, processor.summary_statistics().unwrap());
    assert_eq!(report.rows, 13);
    assert_eq!(report.inputs.len(), 3);

    let generator = ReportGenerator::new(dir.path().join("reports"));
    let path = generator.write_report_to_file(&report, "sleep").unwrap();
    assert!(path.ends_with("reports/sleep_report.json"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["summary"][GENDER_TIME]["kind"], "cross_tab");
    assert_eq!(json["categories"]["terms"][1], "weekend");
}
