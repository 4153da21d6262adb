//! CSV loading with fallback strategies.

use crate::error::{Result, StatdashError};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// Cell tokens read as missing in every column, in addition to empty cells.
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Read a comma-separated file with a header row into a DataFrame.
///
/// Dtypes are inferred from the first `infer_schema_length` rows (`None`
/// scans the whole file). Tries a standard quoted read first, then an
/// unquoted read, then a read of pre-cleaned content. If all of them fail
/// the error names the path and carries the last underlying cause.
pub fn read_csv(path: &Path, infer_schema_length: Option<usize>) -> Result<DataFrame> {
    let load_error = |source: PolarsError| StatdashError::Load {
        path: path.to_path_buf(),
        source,
    };

    // Strategy 1: Standard loading with quote handling
    match read_with_quote(path, infer_schema_length, Some(b'"')) {
        Ok(df) => {
            info!("Loaded {}: {:?}", path.display(), df.shape());
            return Ok(df);
        }
        Err(e) => debug!("Standard loading of {} failed: {}", path.display(), e),
    }

    // Strategy 2: Without quote handling
    match read_with_quote(path, infer_schema_length, None) {
        Ok(df) => {
            warn!("Loaded {} without quote handling", path.display());
            return Ok(df);
        }
        Err(e) => debug!("Loading {} without quotes failed: {}", path.display(), e),
    }

    // Strategy 3: Pre-clean content
    let content = std::fs::read_to_string(path).map_err(|e| load_error(e.into()))?;
    let df = read_options(infer_schema_length, parse_options(Some(b'"')))
        .into_reader_with_file_handle(Cursor::new(clean_csv_content(&content)))
        .finish()
        .map_err(load_error)?;

    warn!("Loaded {} from pre-cleaned content", path.display());
    Ok(df)
}

/// Read a CSV with every column as text.
///
/// Null tokens still become missing cells; typing is left to the caller.
pub fn read_csv_as_text(path: &Path) -> Result<DataFrame> {
    // A zero-row inference window types every column as String.
    read_csv(path, Some(0))
}

fn read_with_quote(
    path: &Path,
    infer_schema_length: Option<usize>,
    quote_char: Option<u8>,
) -> PolarsResult<DataFrame> {
    read_options(infer_schema_length, parse_options(quote_char))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

fn read_options(infer_schema_length: Option<usize>, parse: CsvParseOptions) -> CsvReadOptions {
    CsvReadOptions::default()
        .with_infer_schema_length(infer_schema_length)
        .with_has_header(true)
        .with_parse_options(parse)
}

fn parse_options(quote_char: Option<u8>) -> CsvParseOptions {
    let tokens = NULL_TOKENS.iter().map(|t| PlSmallStr::from(*t)).collect();
    CsvParseOptions::default()
        .with_quote_char(quote_char)
        .with_null_values(Some(NullValues::AllColumns(tokens)))
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
