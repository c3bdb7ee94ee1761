//! Metrics Calculator Module
//! Derived columns of the merged table: inventories-to-sales ratio and
//! year-over-year sales growth.

use crate::config::GrowthBasis;
use chrono::{Months, NaiveDate};
use statrs::statistics::Statistics;
use std::collections::HashMap;

/// Stateless metric computations over joined rows.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// `inventories / sales`, or `None` when sales is zero.
    pub fn inventories_to_sales_ratio(inventories: f64, sales: f64) -> Option<f64> {
        if sales == 0.0 {
            return None;
        }
        Some(inventories / sales)
    }

    /// Percent change from `base` to `current`, or `None` when `base` is zero.
    pub fn percent_change(current: f64, base: f64) -> Option<f64> {
        if base == 0.0 {
            return None;
        }
        Some(100.0 * (current - base) / base)
    }

    /// Growth against the value `periods` rows earlier. The first `periods`
    /// entries are `None`.
    pub fn growth_by_rows(values: &[f64], periods: usize) -> Vec<Option<f64>> {
        values
            .iter()
            .enumerate()
            .map(|(i, &current)| {
                let base = *values.get(i.checked_sub(periods)?)?;
                Self::percent_change(current, base)
            })
            .collect()
    }

    /// Growth against the row dated exactly one year earlier. Rows whose
    /// prior-year month is absent get `None`. With repeated dates the first
    /// occurrence is the base.
    pub fn growth_by_calendar(dates: &[NaiveDate], values: &[f64]) -> Vec<Option<f64>> {
        let mut first_by_date: HashMap<NaiveDate, f64> = HashMap::new();
        for (&date, &value) in dates.iter().zip(values) {
            first_by_date.entry(date).or_insert(value);
        }

        dates
            .iter()
            .zip(values)
            .map(|(date, &current)| {
                let prior = date.checked_sub_months(Months::new(12))?;
                let base = *first_by_date.get(&prior)?;
                Self::percent_change(current, base)
            })
            .collect()
    }

    pub fn sales_growth(
        basis: GrowthBasis,
        periods: usize,
        dates: &[NaiveDate],
        values: &[f64],
    ) -> Vec<Option<f64>> {
        match basis {
            GrowthBasis::Rows => Self::growth_by_rows(values, periods),
            GrowthBasis::Calendar => Self::growth_by_calendar(dates, values),
        }
    }

    /// Arithmetic mean, or `None` for an empty slice.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().mean())
    }
}
