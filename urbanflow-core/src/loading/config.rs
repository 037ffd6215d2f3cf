use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const INTERSECTIONS_FILE: &str = "intersections.csv";
pub const ROADS_FILE: &str = "roads.csv";
pub const VEHICLES_FILE: &str = "vehicles.csv";

/// Location of the three city tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityDataConfig {
    pub data_dir: PathBuf,
}

impl CityDataConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn intersections_path(&self) -> PathBuf {
        self.data_dir.join(INTERSECTIONS_FILE)
    }

    pub fn roads_path(&self) -> PathBuf {
        self.data_dir.join(ROADS_FILE)
    }

    pub fn vehicles_path(&self) -> PathBuf {
        self.data_dir.join(VEHICLES_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for CityDataConfig {
    fn default() -> Self {
        Self::new("data")
    }
}
