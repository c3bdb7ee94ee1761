//! Data Processor Module
//! Joins the cleaned sales and inventories series on date and derives the
//! ratio and growth columns.

use crate::config::ProcessingConfig;
use crate::data::table::{CleanedSeries, MergedRecord, MergedTable};
use crate::stats::MetricsCalculator;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{info, warn};

/// Handles the join and metric enrichment.
pub struct DataProcessor;

impl DataProcessor {
    /// Inner join on exact date equality, in sales order.
    ///
    /// Repeated dates produce every sales/inventories pairing for that date.
    pub fn inner_join(
        sales: &CleanedSeries,
        inventories: &CleanedSeries,
    ) -> Vec<(NaiveDate, f64, f64)> {
        let mut by_date: HashMap<NaiveDate, Vec<f64>> = HashMap::new();
        for obs in &inventories.observations {
            by_date.entry(obs.date).or_default().push(obs.value);
        }

        let mut joined = Vec::with_capacity(sales.len());
        for obs in &sales.observations {
            if let Some(matches) = by_date.get(&obs.date) {
                for &inv in matches {
                    joined.push((obs.date, obs.value, inv));
                }
            }
        }
        joined
    }

    /// Build the merged table, or `None` when either input is empty.
    pub fn build_merged_table(
        sales: &CleanedSeries,
        inventories: &CleanedSeries,
        options: &ProcessingConfig,
    ) -> Option<MergedTable> {
        if sales.is_empty() {
            warn!(
                series = %sales.name,
                "sales series is empty, check the sales file header or structure"
            );
        }
        if inventories.is_empty() {
            warn!(
                series = %inventories.name,
                "inventories series is empty, check the inventories file header or structure"
            );
        }
        if sales.is_empty() || inventories.is_empty() {
            return None;
        }

        for series in [sales, inventories] {
            let duplicates = series.duplicate_dates();
            if duplicates > 0 {
                warn!(
                    series = %series.name,
                    duplicates,
                    "repeated dates will be cross-joined"
                );
            }
        }

        let joined = Self::inner_join(sales, inventories);
        let dates: Vec<NaiveDate> = joined.iter().map(|(d, _, _)| *d).collect();
        let sales_values: Vec<f64> = joined.iter().map(|(_, s, _)| *s).collect();
        let growth = MetricsCalculator::sales_growth(
            options.growth_basis,
            options.growth_periods,
            &dates,
            &sales_values,
        );

        let rows: Vec<MergedRecord> = joined
            .into_iter()
            .zip(growth)
            .map(|((date, sales, inventories), growth)| {
                let ratio = MetricsCalculator::inventories_to_sales_ratio(inventories, sales);
                if ratio.is_none() {
                    warn!(%date, "zero sales, ratio left undefined");
                }
                MergedRecord {
                    date,
                    sales_total_nominal: sales,
                    inventories_total_nominal: inventories,
                    inventories_to_sales_ratio_nominal: ratio,
                    sales_yoy_growth: growth,
                }
            })
            .collect();

        info!(
            rows = rows.len(),
            sales_rows = sales.len(),
            inventories_rows = inventories.len(),
            "merged series on date"
        );

        Some(MergedTable { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrowthBasis;
    use crate::data::table::Observation;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn series(name: &str, points: &[(NaiveDate, f64)]) -> CleanedSeries {
        CleanedSeries::from_observations(
            name,
            points
                .iter()
                .map(|&(date, value)| Observation { date, value })
                .collect(),
        )
    }

    fn monthly(
        name: &str,
        start_year: i32,
        n: usize,
        value: impl Fn(usize) -> f64,
    ) -> CleanedSeries {
        let points: Vec<(NaiveDate, f64)> = (0..n)
            .map(|i| {
                let y = start_year + (i / 12) as i32;
                let m = (i % 12) as u32 + 1;
                (month(y, m), value(i))
            })
            .collect();
        series(name, &points)
    }

    #[test]
    fn empty_input_aborts() {
        let full = series("Sales", &[(month(2020, 1), 1.0)]);
        let empty = CleanedSeries::new("Inventories");
        let options = ProcessingConfig::default();

        assert!(DataProcessor::build_merged_table(&full, &empty, &options).is_none());
        assert!(DataProcessor::build_merged_table(&empty, &full, &options).is_none());
        assert!(DataProcessor::build_merged_table(&empty, &empty, &options).is_none());
    }

    #[test]
    fn inner_join_keeps_only_common_dates() {
        let sales = series(
            "Sales",
            &[(month(2019, 12), 9.0), (month(2020, 1), 100.0), (month(2020, 2), 200.0)],
        );
        let inventories = series(
            "Inventories",
            &[(month(2020, 1), 150.0), (month(2020, 2), 260.0), (month(2020, 3), 1.0)],
        );

        let table =
            DataProcessor::build_merged_table(&sales, &inventories, &ProcessingConfig::default())
                .unwrap();
        let dates: Vec<NaiveDate> = table.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![month(2020, 1), month(2020, 2)]);
        assert_eq!(table.rows[1].inventories_total_nominal, 260.0);
    }

    #[test]
    fn ratio_matches_quotient_for_every_row() {
        let sales = monthly("Sales", 2018, 30, |i| 400_000.0 + 1_000.0 * i as f64);
        let inventories = monthly("Inventories", 2018, 30, |i| 550_000.0 - 700.0 * i as f64);

        let table =
            DataProcessor::build_merged_table(&sales, &inventories, &ProcessingConfig::default())
                .unwrap();
        for row in &table.rows {
            let expected = row.inventories_total_nominal / row.sales_total_nominal;
            let ratio = row.inventories_to_sales_ratio_nominal.unwrap();
            assert!((ratio - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn growth_is_null_for_first_twelve_rows() {
        let sales = monthly("Sales", 2018, 13, |_| 100.0);
        let inventories = monthly("Inventories", 2018, 13, |_| 130.0);

        let table =
            DataProcessor::build_merged_table(&sales, &inventories, &ProcessingConfig::default())
                .unwrap();
        assert!(table.rows[..12].iter().all(|r| r.sales_yoy_growth.is_none()));
        assert_eq!(table.rows[12].sales_yoy_growth, Some(0.0));
    }

    #[test]
    fn row_and_calendar_growth_diverge_across_gaps() {
        // Inventories lack 2019-06, so the join has 24 - 1 rows.
        let sales = monthly("Sales", 2019, 24, |i| 100.0 + i as f64);
        let mut inventories = monthly("Inventories", 2019, 24, |_| 120.0);
        inventories.observations.retain(|o| o.date != month(2019, 6));

        let rows_table =
            DataProcessor::build_merged_table(&sales, &inventories, &ProcessingConfig::default())
                .unwrap();
        let calendar_options = ProcessingConfig {
            growth_basis: GrowthBasis::Calendar,
            ..ProcessingConfig::default()
        };
        let calendar_table =
            DataProcessor::build_merged_table(&sales, &inventories, &calendar_options).unwrap();

        assert_eq!(rows_table.len(), 23);
        let idx = rows_table
            .rows
            .iter()
            .position(|r| r.date == month(2020, 6))
            .unwrap();
        let calendar = calendar_table.rows[idx].sales_yoy_growth;
        assert_eq!(calendar, None);
        assert!(rows_table.rows[idx].sales_yoy_growth.is_some());

        let idx = rows_table
            .rows
            .iter()
            .position(|r| r.date == month(2020, 7))
            .unwrap();
        let calendar = calendar_table.rows[idx].sales_yoy_growth.unwrap();
        // 2020-07 is i = 18, 2019-07 is i = 6.
        assert!((calendar - 100.0 * 12.0 / 106.0).abs() < 1e-12);
    }

    #[test]
    fn duplicate_dates_cross_join() {
        let sales = series("Sales", &[(month(2020, 1), 100.0), (month(2020, 1), 110.0)]);
        let inventories = series(
            "Inventories",
            &[(month(2020, 1), 150.0), (month(2020, 1), 160.0), (month(2020, 1), 170.0)],
        );

        let table =
            DataProcessor::build_merged_table(&sales, &inventories, &ProcessingConfig::default())
                .unwrap();
        assert_eq!(table.len(), 6);
        let pairs: Vec<(f64, f64)> = table
            .rows
            .iter()
            .map(|r| (r.sales_total_nominal, r.inventories_total_nominal))
            .collect();
        assert_eq!(pairs[0], (100.0, 150.0));
        assert_eq!(pairs[2], (100.0, 170.0));
        assert_eq!(pairs[3], (110.0, 150.0));
    }

    #[test]
    fn zero_sales_leaves_ratio_undefined() {
        let sales = series("Sales", &[(month(2020, 1), 0.0), (month(2020, 2), 10.0)]);
        let inventories = series("Inventories", &[(month(2020, 1), 5.0), (month(2020, 2), 20.0)]);

        let table =
            DataProcessor::build_merged_table(&sales, &inventories, &ProcessingConfig::default())
                .unwrap();
        assert_eq!(table.rows[0].inventories_to_sales_ratio_nominal, None);
        assert_eq!(table.rows[1].inventories_to_sales_ratio_nominal, Some(2.0));
    }
}
