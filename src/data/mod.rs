//! Data module - CSV loading, cleaning, merging and persistence

mod loader;
mod processor;
mod table;

pub use loader::{
    clean_records, load_and_clean, normalize_month, normalize_year, parse_month_date,
    parse_value, RawRecord, PREAMBLE_LINES,
};
pub use processor::DataProcessor;
pub use table::{
    write_merged_csv, CleanedSeries, MergedRecord, MergedTable, Observation, TableError,
    DATE_COL, GROWTH_COL, INVENTORIES_COL, RATIO_COL, SALES_COL,
};
