//! Driver configuration loaded from TOML

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use urbanflow_core::traffic::CongestionModel;

/// Settings of one simulation run.
///
/// Every key is optional; missing keys fall back to [`AppConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `intersections.csv`, `roads.csv` and `vehicles.csv`
    pub data_dir: PathBuf,
    /// Directory the exports are written to
    pub output_dir: PathBuf,
    pub ticks: usize,
    pub step: f64,
    pub congestion: CongestionModel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            ticks: 20,
            step: 1.0,
            congestion: CongestionModel::bpr(0.15, 4.0),
        }
    }
}

impl AppConfig {
    /// Reads a configuration file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no simulation can run with.
    ///
    /// # Errors
    /// Returns error for a non-positive or non-finite step.
    pub fn validate(&self) -> Result<()> {
        if !(self.step.is_finite() && self.step > 0.0) {
            bail!("Simulation step must be a positive number, got {}", self.step);
        }
        Ok(())
    }
}
