//! Pipeline configuration.
//!
//! The directory layout and processing options are explicit parameters. Every
//! field has a default matching the standard project layout, so an empty TOML
//! file (or no file at all) reproduces it:
//!
//! ```text
//! <root>/data/raw/Sales_Adjusted.csv
//! <root>/data/raw/Inventories_Adjusted.csv
//! <root>/data/processed/merged_wts_data_nominal.csv
//! <root>/charts/*.png
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("growth_periods must be at least 1")]
    ZeroGrowthPeriods,
}

/// Top-level configuration for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub processing: ProcessingConfig,
    pub charts: ChartConfig,
}

/// Input/output locations, relative to `root` unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub root: PathBuf,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub charts_dir: PathBuf,
    pub sales_file: String,
    pub inventories_file: String,
    pub merged_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            raw_dir: PathBuf::from("data").join("raw"),
            processed_dir: PathBuf::from("data").join("processed"),
            charts_dir: PathBuf::from("charts"),
            sales_file: "Sales_Adjusted.csv".to_string(),
            inventories_file: "Inventories_Adjusted.csv".to_string(),
            merged_file: "merged_wts_data_nominal.csv".to_string(),
        }
    }
}

impl PathsConfig {
    fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.resolve(&self.raw_dir)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.resolve(&self.processed_dir)
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.resolve(&self.charts_dir)
    }

    pub fn sales_path(&self) -> PathBuf {
        self.raw_dir().join(&self.sales_file)
    }

    pub fn inventories_path(&self) -> PathBuf {
        self.raw_dir().join(&self.inventories_file)
    }

    pub fn merged_path(&self) -> PathBuf {
        self.processed_dir().join(&self.merged_file)
    }
}

/// How the year-over-year comparison point is chosen.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrowthBasis {
    /// Compare against the row `growth_periods` positions earlier.
    #[default]
    Rows,
    /// Compare against the row dated exactly one year earlier, if joined.
    Calendar,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessingConfig {
    pub growth_basis: GrowthBasis,
    /// Row offset used by [`GrowthBasis::Rows`].
    pub growth_periods: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            growth_basis: GrowthBasis::Rows,
            growth_periods: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
    /// TrueType font used for titles, ticks and legends. When unset, common
    /// system locations are searched.
    pub font_path: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        // 12x6 inch figure at 100 dpi
        Self {
            enabled: true,
            width: 1200,
            height: 600,
            font_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a TOML file. Missing keys take defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Defaults with every path anchored at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.paths.root = root.into();
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.growth_periods == 0 {
            return Err(ConfigError::ZeroGrowthPeriods);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_standard_layout() {
        let config = PipelineConfig::with_root("/project");
        assert_eq!(
            config.paths.sales_path(),
            PathBuf::from("/project/data/raw/Sales_Adjusted.csv")
        );
        assert_eq!(
            config.paths.inventories_path(),
            PathBuf::from("/project/data/raw/Inventories_Adjusted.csv")
        );
        assert_eq!(
            config.paths.merged_path(),
            PathBuf::from("/project/data/processed/merged_wts_data_nominal.csv")
        );
        assert_eq!(config.paths.charts_dir(), PathBuf::from("/project/charts"));
        assert_eq!(config.processing.growth_periods, 12);
        assert_eq!(config.processing.growth_basis, GrowthBasis::Rows);
    }

    #[test]
    fn empty_toml_is_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [paths]
            charts_dir = "/tmp/out/charts"

            [processing]
            growth_basis = "calendar"
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.charts_dir(), PathBuf::from("/tmp/out/charts"));
        assert_eq!(config.paths.raw_dir, PathBuf::from("data/raw"));
        assert_eq!(config.processing.growth_basis, GrowthBasis::Calendar);
        assert_eq!(config.processing.growth_periods, 12);
        assert!(config.charts.enabled);
    }

    #[test]
    fn zero_growth_periods_is_rejected() {
        let mut config = PipelineConfig::default();
        config.processing.growth_periods = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroGrowthPeriods)
        ));
    }
}
