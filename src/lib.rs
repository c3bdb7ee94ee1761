//! Wholesale Trends - Census wholesale trade ETL and charts
//!
//! Loads the seasonally adjusted sales and inventories series for U.S.
//! merchant wholesalers (NAICS 42), joins them by month, derives the
//! inventories-to-sales ratio and year-over-year sales growth, writes the
//! merged table as CSV and renders four verification charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod stats;

pub use config::PipelineConfig;
pub use pipeline::{run, PipelineError, RunOutcome, RunReport};
