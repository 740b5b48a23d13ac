//! Configuration for the panel pipeline.

use crate::error::PanelError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Commodity code tagged as the target purchase by default.
pub const DEFAULT_TARGET_COMMODITY: &str = "EGGS";

/// Main configuration for a panel run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Number of lag features per snapshot, including the target week
    pub lag_depth: usize,

    /// Commodity description that marks a target purchase (exact match)
    pub target_commodity: String,

    /// How snapshot weeks are labeled in the output
    pub week_label: WeekLabelStyle,

    /// Whether demographic and spend attributes are joined onto the panel
    pub enrich_attributes: bool,

    /// Row order used when leveling demographic fields per household
    pub demographic_order: DemographicOrder,

    /// Directory a bare input file name is resolved against
    pub raw_data_dir: PathBuf,

    /// Directory a bare output file name is resolved against
    pub processed_data_dir: PathBuf,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            lag_depth: 4,
            target_commodity: DEFAULT_TARGET_COMMODITY.to_string(),
            week_label: WeekLabelStyle::Day,
            enrich_attributes: true,
            demographic_order: DemographicOrder::EarliestDay,
            raw_data_dir: PathBuf::from("../data/raw"),
            processed_data_dir: PathBuf::from("../data/processed"),
        }
    }
}

impl PanelConfig {
    /// Load configuration from the default location, or defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Get the path to the default configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("egg-lag-panel")
            .join("config.json")
    }

    /// Check settings that do not depend on the input data.
    pub fn validate(&self) -> Result<(), PanelError> {
        if self.lag_depth == 0 {
            return Err(PanelError::Configuration(
                "lag depth must be at least 1".to_string(),
            ));
        }
        if self.target_commodity.is_empty() {
            return Err(PanelError::Configuration(
                "target commodity code must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve an input path; a bare file name lands in the raw data directory.
    pub fn resolve_input(&self, raw: &str) -> PathBuf {
        resolve_bare_name(raw, &self.raw_data_dir)
    }

    /// Resolve an output path; a bare file name lands in the processed data directory.
    pub fn resolve_output(&self, raw: &str) -> PathBuf {
        resolve_bare_name(raw, &self.processed_data_dir)
    }
}

fn resolve_bare_name(raw: &str, base: &Path) -> PathBuf {
    if raw.contains('/') || raw.contains(std::path::MAIN_SEPARATOR) {
        PathBuf::from(raw)
    } else {
        base.join(raw)
    }
}

/// Labeling convention for snapshot weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WeekLabelStyle {
    /// Integer cutoff day under the `weekOf` column
    Day,
    /// `"Week of {day}"` under the `week` column
    Descriptive,
}

impl WeekLabelStyle {
    /// Output column name for this style.
    pub fn column_name(self) -> &'static str {
        match self {
            WeekLabelStyle::Day => "weekOf",
            WeekLabelStyle::Descriptive => "week",
        }
    }

    /// Render the label for a snapshot cutoff day.
    pub fn render(self, cutoff_day: i64) -> String {
        match self {
            WeekLabelStyle::Day => cutoff_day.to_string(),
            WeekLabelStyle::Descriptive => format!("Week of {cutoff_day}"),
        }
    }
}

/// Row order used to pick the first non-null demographic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DemographicOrder {
    /// Stable sort by day first, ties keep source order
    EarliestDay,
    /// Source row order
    SourceOrder,
}

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
}
