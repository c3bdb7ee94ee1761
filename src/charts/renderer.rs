//! Static Chart Renderer
//! Draws the four verification charts for the merged table as PNG files.
//!
//! Charts:
//! 1. Nominal sales trend
//! 2. Inventory-to-sales ratio with its average as a reference line
//! 3. Year-over-year sales growth with a zero line
//! 4. Sales vs. inventories levels

use crate::charts::fonts::ensure_chart_font;
use crate::config::ChartConfig;
use crate::data::MergedTable;
use crate::stats::MetricsCalculator;
use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use std::fmt::Display;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const SALES_TREND_FILE: &str = "1_nominal_sales_trend.png";
pub const RATIO_TREND_FILE: &str = "2_nominal_is_ratio_trend.png";
pub const GROWTH_FILE: &str = "3_yoy_sales_growth.png";
pub const LEVELS_FILE: &str = "4_sales_vs_inventories_levels.png";

pub const CHART_FILES: [&str; 4] = [
    SALES_TREND_FILE,
    RATIO_TREND_FILE,
    GROWTH_FILE,
    LEVELS_FILE,
];

// Colors (matplotlib tab10)
const SALES_BLUE: RGBColor = RGBColor(31, 119, 180);
const INVENTORY_ORANGE: RGBColor = RGBColor(255, 127, 14);
const GROWTH_GREEN: RGBColor = RGBColor(44, 160, 44);
const RATIO_RED: RGBColor = RGBColor(214, 39, 40);
const REFERENCE_GRAY: RGBColor = RGBColor(128, 128, 128);
const GRID: RGBColor = RGBColor(176, 176, 176);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Nothing to chart: merged table is empty")]
    EmptyTable,
    #[error("Failed to draw {file}: {message}")]
    Drawing { file: String, message: String },
}

fn drawing_error(file: &str, e: &dyn Display) -> ChartError {
    ChartError::Drawing {
        file: file.to_string(),
        message: e.to_string(),
    }
}

struct LineSpec {
    /// Legend entry; unlabeled lines stay out of the legend.
    label: Option<String>,
    color: RGBColor,
    width: u32,
    points: Vec<(f64, f64)>,
}

struct ChartSpec {
    file: &'static str,
    title: &'static str,
    y_desc: &'static str,
    y_precision: usize,
    lines: Vec<LineSpec>,
}

/// Renders the merged table to PNG charts.
pub struct StaticChartRenderer {
    width: u32,
    height: u32,
    draw_text: bool,
}

impl StaticChartRenderer {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            draw_text: ensure_chart_font(config.font_path.as_deref()),
        }
    }

    /// Write all four charts into `dir`, which must exist. Returns the paths
    /// written, in chart order.
    pub fn render_charts(
        &self,
        table: &MergedTable,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, ChartError> {
        if table.is_empty() {
            return Err(ChartError::EmptyTable);
        }

        info!(dir = %dir.display(), "generating verification charts");

        let x_range = Self::x_range(table);
        let mut written = Vec::with_capacity(CHART_FILES.len());
        for spec in Self::chart_specs(table, &x_range) {
            let path = dir.join(spec.file);
            self.draw_line_chart(&spec, x_range.clone(), &path)?;
            debug!(chart = spec.file, "chart written");
            written.push(path);
        }

        info!(count = written.len(), "charts saved");
        Ok(written)
    }

    fn chart_specs(table: &MergedTable, x_range: &Range<f64>) -> Vec<ChartSpec> {
        let sales: Vec<(f64, f64)> = table
            .rows
            .iter()
            .map(|r| (Self::x_value(r.date), r.sales_total_nominal))
            .collect();
        let inventories: Vec<(f64, f64)> = table
            .rows
            .iter()
            .map(|r| (Self::x_value(r.date), r.inventories_total_nominal))
            .collect();
        let ratio: Vec<(f64, f64)> = table
            .ratio_points()
            .into_iter()
            .map(|(d, v)| (Self::x_value(d), v))
            .collect();
        let growth: Vec<(f64, f64)> = table
            .growth_points()
            .into_iter()
            .map(|(d, v)| (Self::x_value(d), v))
            .collect();

        let mut ratio_lines = vec![LineSpec {
            label: Some("I/S Ratio".to_string()),
            color: RATIO_RED,
            width: 2,
            points: ratio.clone(),
        }];
        let ratio_values: Vec<f64> = ratio.iter().map(|&(_, v)| v).collect();
        if let Some(avg) = MetricsCalculator::mean(&ratio_values) {
            ratio_lines.push(Self::reference_line(
                Some(format!("Average ({:.2})", avg)),
                avg,
                x_range,
            ));
        }

        let mut zero_line = Self::reference_line(None, 0.0, x_range);
        zero_line.color = RED;
        zero_line.width = 1;

        vec![
            ChartSpec {
                file: SALES_TREND_FILE,
                title: "Nominal Sales Trend of U.S. Merchant Wholesalers (Seasonally Adjusted)",
                y_desc: "Sales (Millions of Dollars)",
                y_precision: 0,
                lines: vec![LineSpec {
                    label: Some("Total Sales".to_string()),
                    color: SALES_BLUE,
                    width: 2,
                    points: sales.clone(),
                }],
            },
            ChartSpec {
                file: RATIO_TREND_FILE,
                title: "Inventory-to-Sales Ratio Trend (Key Health Metric)",
                y_desc: "Ratio (Inventories / Sales)",
                y_precision: 2,
                lines: ratio_lines,
            },
            ChartSpec {
                file: GROWTH_FILE,
                title: "Year-over-Year Sales Growth (Recession Indicator)",
                y_desc: "Growth (%)",
                y_precision: 1,
                lines: vec![
                    LineSpec {
                        label: Some("YoY Sales Growth".to_string()),
                        color: GROWTH_GREEN,
                        width: 2,
                        points: growth,
                    },
                    zero_line,
                ],
            },
            ChartSpec {
                file: LEVELS_FILE,
                title: "Sales vs. Inventories (Comparative Levels)",
                y_desc: "Millions of Dollars",
                y_precision: 0,
                lines: vec![
                    LineSpec {
                        label: Some("Sales".to_string()),
                        color: SALES_BLUE,
                        width: 2,
                        points: sales,
                    },
                    LineSpec {
                        label: Some("Inventories".to_string()),
                        color: INVENTORY_ORANGE,
                        width: 2,
                        points: inventories,
                    },
                ],
            },
        ]
    }

    fn draw_line_chart(
        &self,
        spec: &ChartSpec,
        x_range: Range<f64>,
        path: &Path,
    ) -> Result<(), ChartError> {
        let y_range = Self::y_range(&spec.lines);
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| drawing_error(spec.file, &e))?;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(20);
        if self.draw_text {
            builder
                .caption(spec.title, ("sans-serif", 22))
                .x_label_area_size(40)
                .y_label_area_size(90);
        }
        let mut chart = builder
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| drawing_error(spec.file, &e))?;

        if self.draw_text {
            let precision = spec.y_precision;
            chart
                .configure_mesh()
                .bold_line_style(&GRID.mix(0.5))
                .light_line_style(&GRID.mix(0.15))
                .x_desc("Date")
                .y_desc(spec.y_desc)
                .x_label_formatter(&|x: &f64| Self::x_label(*x))
                .y_label_formatter(&|y| format!("{:.*}", precision, y))
                .draw()
                .map_err(|e| drawing_error(spec.file, &e))?;
        }

        for line in &spec.lines {
            let color = line.color;
            let width = line.width;
            let series = chart
                .draw_series(LineSeries::new(
                    line.points.iter().copied(),
                    color.stroke_width(width),
                ))
                .map_err(|e| drawing_error(spec.file, &e))?;
            if let Some(label) = &line.label {
                series.label(label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width))
                });
            }
        }

        if self.draw_text {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(|e| drawing_error(spec.file, &e))?;
        }

        root.present().map_err(|e| drawing_error(spec.file, &e))?;
        Ok(())
    }

    fn reference_line(label: Option<String>, y: f64, x_range: &Range<f64>) -> LineSpec {
        LineSpec {
            label,
            color: REFERENCE_GRAY,
            width: 1,
            points: vec![(x_range.start, y), (x_range.end, y)],
        }
    }

    /// Fractional year: January 2020 is 2020.0, July 2020 is 2020.5.
    fn x_value(date: NaiveDate) -> f64 {
        date.year() as f64 + date.month0() as f64 / 12.0
    }

    /// Inverse of [`Self::x_value`] for tick labels: `2020.5` → `"2020-07"`.
    fn x_label(x: f64) -> String {
        let months = (x * 12.0).round() as i64;
        format!("{}-{:02}", months.div_euclid(12), months.rem_euclid(12) + 1)
    }

    fn x_range(table: &MergedTable) -> Range<f64> {
        let xs = table.rows.iter().map(|r| Self::x_value(r.date));
        let (min, max) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
        if min >= max {
            return (min - 0.5)..(max + 0.5);
        }
        min..max
    }

    fn y_range(lines: &[LineSpec]) -> Range<f64> {
        let (min, max) = lines
            .iter()
            .flat_map(|l| l.points.iter().map(|&(_, y)| y))
            .filter(|y| y.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            });
        if min.is_infinite() {
            return 0.0..1.0;
        }
        let pad = if max > min {
            (max - min) * 0.05
        } else {
            min.abs().max(1.0) * 0.05
        };
        (min - pad)..(max + pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MergedRecord;

    fn table(n: usize) -> MergedTable {
        let rows = (0..n)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2018 + (i / 12) as i32, (i % 12) as u32 + 1, 1)
                    .unwrap();
                let sales = 400_000.0 + 2_000.0 * i as f64;
                let inventories = 560_000.0 + 1_000.0 * i as f64;
                MergedRecord {
                    date,
                    sales_total_nominal: sales,
                    inventories_total_nominal: inventories,
                    inventories_to_sales_ratio_nominal: Some(inventories / sales),
                    sales_yoy_growth: (i >= 12).then(|| 100.0 * 24_000.0 / (sales - 24_000.0)),
                }
            })
            .collect();
        MergedTable { rows }
    }

    #[test]
    fn x_value_is_fractional_year() {
        let d = NaiveDate::from_ymd_opt(2020, 7, 1).unwrap();
        assert_eq!(StaticChartRenderer::x_value(d), 2020.5);
    }

    #[test]
    fn x_label_round_trips_month() {
        let d = NaiveDate::from_ymd_opt(2019, 12, 1).unwrap();
        assert_eq!(StaticChartRenderer::x_label(StaticChartRenderer::x_value(d)), "2019-12");
        assert_eq!(StaticChartRenderer::x_label(2020.0), "2020-01");
    }

    #[test]
    fn single_row_gets_padded_x_range() {
        let range = StaticChartRenderer::x_range(&table(1));
        assert!(range.start < range.end);
    }

    #[test]
    fn y_range_covers_all_lines_with_padding() {
        let lines = vec![
            LineSpec {
                label: None,
                color: SALES_BLUE,
                width: 1,
                points: vec![(0.0, 10.0), (1.0, 20.0)],
            },
            LineSpec {
                label: None,
                color: SALES_BLUE,
                width: 1,
                points: vec![(0.0, -5.0)],
            },
        ];
        let range = StaticChartRenderer::y_range(&lines);
        assert!(range.start < -5.0);
        assert!(range.end > 20.0);
    }

    #[test]
    fn ratio_chart_has_average_reference() {
        let t = table(24);
        let x = StaticChartRenderer::x_range(&t);
        let specs = StaticChartRenderer::chart_specs(&t, &x);
        let ratio = specs.iter().find(|s| s.file == RATIO_TREND_FILE).unwrap();
        assert_eq!(ratio.lines.len(), 2);
        assert!(ratio.lines[1]
            .label
            .as_deref()
            .is_some_and(|l| l.starts_with("Average (")));
        let avg = ratio.lines[1].points[0].1;
        assert_eq!(ratio.lines[1].points[1].1, avg);
    }

    #[test]
    fn growth_chart_skips_undefined_rows() {
        let t = table(20);
        let x = StaticChartRenderer::x_range(&t);
        let specs = StaticChartRenderer::chart_specs(&t, &x);
        let growth = specs.iter().find(|s| s.file == GROWTH_FILE).unwrap();
        assert_eq!(growth.lines[0].points.len(), 8);
        assert!(growth.lines[1].points.iter().all(|&(_, y)| y == 0.0));
        assert!(growth.lines[1].label.is_none());
    }

    #[test]
    fn empty_table_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = StaticChartRenderer::new(&ChartConfig::default());
        let err = renderer
            .render_charts(&MergedTable::default(), dir.path())
            .unwrap_err();
        assert!(matches!(err, ChartError::EmptyTable));
    }

    #[test]
    fn renders_four_pngs_at_configured_size() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChartConfig {
            width: 640,
            height: 320,
            ..ChartConfig::default()
        };
        let renderer = StaticChartRenderer::new(&config);
        let written = renderer.render_charts(&table(30), dir.path()).unwrap();

        assert_eq!(written.len(), 4);
        for (path, name) in written.iter().zip(CHART_FILES) {
            assert_eq!(path.file_name().unwrap().to_str().unwrap(), name);
            let img = image::open(path).unwrap();
            assert_eq!((img.width(), img.height()), (640, 320));
        }
    }

    #[test]
    fn missing_output_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = StaticChartRenderer::new(&ChartConfig::default());
        let result = renderer.render_charts(&table(3), &dir.path().join("absent"));
        assert!(matches!(result, Err(ChartError::Drawing { .. })));
    }
}
