//! Report generation module.
//!
//! [`DatasetReport`] gathers what one pipeline run produced: classification
//! or category inventory, the summary tables and outlier counts. It is
//! suitable for:
//! - Plain-text output to stdout
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--emit-report` CLI flag)
//!
//! # Example
//!
//! ```rust,ignore
//! use statdash_processing::reporting::{DatasetReport, ReportGenerator};
//!
//! let summary = processor.summary_statistics()?;
//! let report = DatasetReport::from_survey("sleep", &processor, summary);
//!
//! println!("{}", ReportGenerator::render_text(&report));
//!
//! let generator = ReportGenerator::new(PathBuf::from("output"));
//! generator.write_report_to_file(&report, "sleep")?;
//! ```

mod generator;

pub use generator::{DatasetReport, ReportGenerator};
