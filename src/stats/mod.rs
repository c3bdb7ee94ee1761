//! Stats module - derived metrics

mod calculator;

pub use calculator::MetricsCalculator;
