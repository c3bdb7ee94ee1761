//! Series and merged-table types, plus persistence of the merged table.

use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

pub const DATE_COL: &str = "Date";
pub const SALES_COL: &str = "Sales_Total_Nominal";
pub const INVENTORIES_COL: &str = "Inventories_Total_Nominal";
pub const RATIO_COL: &str = "Inventories_to_Sales_Ratio_Nominal";
pub const GROWTH_COL: &str = "Sales_YoY_Growth";

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One month of a cleaned series. `date` is always the first of the month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// A cleaned (Date, Value) series, sorted by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedSeries {
    pub name: String,
    pub observations: Vec<Observation>,
}

impl CleanedSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            observations: Vec::new(),
        }
    }

    /// Build a series from unsorted observations. Sorting is stable, so rows
    /// sharing a date keep their file order.
    pub fn from_observations(name: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        Self {
            name: name.into(),
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of dates that appear more than once.
    pub fn duplicate_dates(&self) -> usize {
        let mut count = 0;
        let mut last_duplicate = None;
        for w in self.observations.windows(2) {
            if w[0].date == w[1].date && last_duplicate != Some(w[0].date) {
                count += 1;
                last_duplicate = Some(w[0].date);
            }
        }
        count
    }
}

/// One joined month with its derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub sales_total_nominal: f64,
    pub inventories_total_nominal: f64,
    pub inventories_to_sales_ratio_nominal: Option<f64>,
    pub sales_yoy_growth: Option<f64>,
}

/// The merged, enriched table. Rows are sorted by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTable {
    pub rows: Vec<MergedRecord>,
}

impl MergedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sales(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.sales_total_nominal).collect()
    }

    /// Rows with a defined growth value, as (date, growth) pairs.
    pub fn growth_points(&self) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.sales_yoy_growth.map(|g| (r.date, g)))
            .collect()
    }

    /// Rows with a defined ratio, as (date, ratio) pairs.
    pub fn ratio_points(&self) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.inventories_to_sales_ratio_nominal.map(|v| (r.date, v)))
            .collect()
    }

    /// Column-oriented view used for persistence. Dates are ISO formatted.
    pub fn to_dataframe(&self) -> Result<DataFrame, TableError> {
        let dates: Vec<String> = self
            .rows
            .iter()
            .map(|r| r.date.format("%Y-%m-%d").to_string())
            .collect();
        let sales: Vec<f64> = self.sales();
        let inventories: Vec<f64> = self
            .rows
            .iter()
            .map(|r| r.inventories_total_nominal)
            .collect();
        let ratio: Vec<Option<f64>> = self
            .rows
            .iter()
            .map(|r| r.inventories_to_sales_ratio_nominal)
            .collect();
        let growth: Vec<Option<f64>> = self.rows.iter().map(|r| r.sales_yoy_growth).collect();

        let df = DataFrame::new(vec![
            Column::new(DATE_COL.into(), dates),
            Column::new(SALES_COL.into(), sales),
            Column::new(INVENTORIES_COL.into(), inventories),
            Column::new(RATIO_COL.into(), ratio),
            Column::new(GROWTH_COL.into(), growth),
        ])?;

        Ok(df)
    }
}

/// Write the merged table as CSV with a header row and no index column,
/// replacing any existing file. Nulls are written as empty fields.
pub fn write_merged_csv(table: &MergedTable, path: &Path) -> Result<(), TableError> {
    let mut df = table.to_dataframe()?;
    let mut file = File::create(path).map_err(|source| TableError::Io {
        path: path.display().to_string(),
        source,
    })?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;

    Ok(())
}
