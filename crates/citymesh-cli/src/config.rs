//! Settings file written by `citymesh init`.
//!
//! Command-line flags win over the file, and the file wins over the
//! built-in defaults.

use citymesh_graph::{GraphParams, ViewConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "citymesh.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: PathBuf,
    pub params: GraphParams,
    pub view: ViewConfig,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("worldcitiespop.csv"),
            params: GraphParams::default(),
            view: ViewConfig::default(),
            port: citymesh_server::DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `explicit` if given, else [`CONFIG_FILE`] in `dir` if it
    /// exists, else the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = dir.join(CONFIG_FILE);
        if fallback.exists() {
            Self::load(&fallback)
        } else {
            Ok(Self::default())
        }
    }

    /// Overlays command-line values.
    pub fn apply(
        &mut self,
        dataset: Option<PathBuf>,
        max_distance: Option<f64>,
        min_population: Option<u64>,
    ) {
        if let Some(dataset) = dataset {
            self.dataset = dataset;
        }
        if let Some(max_distance) = max_distance {
            self.params.max_distance_km = max_distance;
        }
        if let Some(min_population) = min_population {
            self.params.min_population = min_population;
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
