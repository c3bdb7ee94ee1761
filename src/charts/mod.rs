//! Charts module - Static chart rendering

mod fonts;
mod renderer;

pub use renderer::{
    ChartError, StaticChartRenderer, CHART_FILES, GROWTH_FILE, LEVELS_FILE, RATIO_TREND_FILE,
    SALES_TREND_FILE,
};
