//! Census CSV Loader Module
//! Reads a Monthly Wholesale Trade CSV with Polars and cleans it into a
//! (Date, Value) series for the NAICS 42 total.

use crate::data::table::{CleanedSeries, Observation};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Title/metadata lines before the header row.
pub const PREAMBLE_LINES: usize = 16;
pub const MONTH_COL: &str = "Month";
pub const YEAR_COL: &str = "Year";
/// NAICS 42: Total Merchant Wholesalers.
pub const TOTAL_COL: &str = "42";

static FOOTNOTE_MARKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("footnote pattern is valid"));
static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Error, Debug)]
enum LoaderError {
    #[error("file not found")]
    NotFound,
    #[error("failed to parse CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
}

/// One data row as it appears in the raw file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub month: Option<String>,
    pub year: Option<String>,
    pub value: Option<String>,
}

impl RawRecord {
    pub fn new(month: &str, year: &str, value: &str) -> Self {
        Self {
            month: Some(month.to_string()),
            year: Some(year.to_string()),
            value: Some(value.to_string()),
        }
    }
}

/// Load a raw CSV and clean it into a series named `value_column_name`.
///
/// A missing or unreadable file is not an error: it yields an empty series
/// and a warning, and the caller decides whether emptiness is fatal.
pub fn load_and_clean(path: &Path, value_column_name: &str) -> CleanedSeries {
    let records = match read_records(path) {
        Ok(records) => records,
        Err(LoaderError::NotFound) => {
            warn!(path = %path.display(), "file not found");
            return CleanedSeries::new(value_column_name);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "file is empty or invalid");
            return CleanedSeries::new(value_column_name);
        }
    };

    let series = clean_records(&records, value_column_name);
    info!(
        rows = series.len(),
        dropped = records.len() - series.len(),
        file = %path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
        "loaded {} rows",
        series.len()
    );
    series
}

/// Clean raw rows: normalize labels, parse date and value, drop failures,
/// sort by date.
pub fn clean_records(records: &[RawRecord], value_column_name: &str) -> CleanedSeries {
    let observations: Vec<Observation> = records
        .iter()
        .filter_map(|r| {
            let date = parse_month_date(r.month.as_deref()?, r.year.as_deref()?)?;
            let value = parse_value(r.value.as_deref()?)?;
            Some(Observation { date, value })
        })
        .collect();

    CleanedSeries::from_observations(value_column_name, observations)
}

/// Strip footnote markers and collapse whitespace: `" Jan.  p "` → `"Jan p"`.
pub fn normalize_month(label: &str) -> String {
    let stripped = FOOTNOTE_MARKS.replace_all(label, "");
    WHITESPACE_RUNS
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// `"2020.0"` → `"2020"`.
pub fn normalize_year(year: &str) -> String {
    year.strip_suffix(".0").unwrap_or(year).trim().to_string()
}

/// Parse a month label and year as the first day of that month. Full month
/// names and abbreviations are accepted; the year must have four digits.
pub fn parse_month_date(month: &str, year: &str) -> Option<NaiveDate> {
    let month = normalize_month(month);
    let year = normalize_year(year);
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("1 {} {}", month, year), "%d %B %Y").ok()
}

/// Parse a value with optional thousands separators. Non-numeric and
/// non-finite values yield `None`.
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn read_records(path: &Path) -> Result<Vec<RawRecord>, LoaderError> {
    if !path.is_file() {
        return Err(LoaderError::NotFound);
    }

    // Every column is read as text; cleaning does its own parsing.
    let df = LazyCsvReader::new(path)
        .with_skip_rows(PREAMBLE_LINES)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_ignore_errors(true)
        .with_truncate_ragged_lines(true)
        .finish()?
        .collect()?;

    debug!(rows = df.height(), columns = df.width(), "read raw table");

    let month = text_column(&df, MONTH_COL)?;
    let year = text_column(&df, YEAR_COL)?;
    let value = text_column(&df, TOTAL_COL)?;

    Ok(month
        .into_iter()
        .zip(year)
        .zip(value)
        .map(|((month, year), value)| RawRecord { month, year, value })
        .collect())
}

/// Fetch a column by header name (ignoring surrounding whitespace) as text.
fn text_column(df: &DataFrame, name: &'static str) -> Result<Vec<Option<String>>, LoaderError> {
    let header = df
        .get_column_names()
        .into_iter()
        .find(|c| c.as_str().trim() == name)
        .map(|c| c.to_string())
        .ok_or(LoaderError::MissingColumn(name))?;

    let column = df.column(&header)?.cast(&DataType::String)?;
    let values = column
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();

    Ok(values)
}
