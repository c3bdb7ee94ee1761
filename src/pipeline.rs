//! End-to-end run: load both series, merge, persist, chart.

use crate::charts::{ChartError, StaticChartRenderer};
use crate::config::{ConfigError, PipelineConfig};
use crate::data::{
    load_and_clean, write_merged_csv, DataProcessor, MergedTable, TableError, INVENTORIES_COL,
    SALES_COL,
};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub merged_path: PathBuf,
    pub rows: usize,
    pub charts: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunReport),
    /// One or both inputs yielded no rows; nothing was written.
    Aborted { empty_inputs: Vec<PathBuf> },
}

/// Run the whole pipeline with `config`.
pub fn run(config: &PipelineConfig) -> Result<RunOutcome, PipelineError> {
    config.validate()?;
    prepare_output_dirs(config)?;

    info!("starting data processing and metric calculation");
    let table = match process_data(config)? {
        Processed::Merged(table) => table,
        Processed::EmptyInputs(empty_inputs) => {
            return Ok(RunOutcome::Aborted { empty_inputs })
        }
    };

    let merged_path = config.paths.merged_path();
    let charts = if !config.charts.enabled {
        info!("chart generation disabled");
        Vec::new()
    } else if table.is_empty() {
        warn!("no dates in common between sales and inventories, skipping charts");
        Vec::new()
    } else {
        generate_charts(config, &table)?
    };

    Ok(RunOutcome::Completed(RunReport {
        merged_path,
        rows: table.len(),
        charts,
    }))
}

fn prepare_output_dirs(config: &PipelineConfig) -> Result<(), PipelineError> {
    for dir in [config.paths.processed_dir(), config.paths.charts_dir()] {
        fs::create_dir_all(&dir).map_err(|source| PipelineError::CreateDir {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(())
}

enum Processed {
    Merged(MergedTable),
    EmptyInputs(Vec<PathBuf>),
}

/// Load, merge and persist the merged table.
fn process_data(config: &PipelineConfig) -> Result<Processed, PipelineError> {
    let sales_path = config.paths.sales_path();
    let inventories_path = config.paths.inventories_path();

    let sales = load_and_clean(&sales_path, SALES_COL);
    let inventories = load_and_clean(&inventories_path, INVENTORIES_COL);

    let Some(table) = DataProcessor::build_merged_table(&sales, &inventories, &config.processing)
    else {
        let empty_inputs: Vec<PathBuf> = [(&sales, sales_path), (&inventories, inventories_path)]
            .into_iter()
            .filter(|(series, _)| series.is_empty())
            .map(|(_, path)| path)
            .collect();
        error!(
            empty = ?empty_inputs,
            "analysis failed: one or both series are empty, aborting"
        );
        return Ok(Processed::EmptyInputs(empty_inputs));
    };

    let merged_path = config.paths.merged_path();
    write_merged_csv(&table, &merged_path)?;
    info!(path = %merged_path.display(), rows = table.len(), "processed data saved");

    Ok(Processed::Merged(table))
}

fn generate_charts(
    config: &PipelineConfig,
    table: &MergedTable,
) -> Result<Vec<PathBuf>, PipelineError> {
    let renderer = StaticChartRenderer::new(&config.charts);
    Ok(renderer.render_charts(table, &config.paths.charts_dir())?)
}
