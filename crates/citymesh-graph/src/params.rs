//! Construction and presentation parameters.

use serde::{Deserialize, Serialize};

/// Default maximum edge length, in kilometres.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 300.0;

/// Default population threshold (exclusive).
pub const DEFAULT_MIN_POPULATION: u64 = 100_000;

/// Default size of the largest population marker.
pub const DEFAULT_CIRCLE_SCALE: f64 = 15.0;

/// The pair of values a graph is built for.
///
/// A graph never outlives its parameters: changing either value means
/// building a new graph. Range checks are the caller's job; the builder
/// uses the values as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphParams {
    /// Cities at most this far apart (great-circle, km) are linked.
    pub max_distance_km: f64,
    /// Cities need strictly more inhabitants than this to become nodes.
    pub min_population: u64,
}

impl GraphParams {
    pub fn new(max_distance_km: f64, min_population: u64) -> Self {
        Self {
            max_distance_km,
            min_population,
        }
    }
}

impl Default for GraphParams {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE_KM, DEFAULT_MIN_POPULATION)
    }
}

/// Settings for the data handed to a map renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewConfig {
    /// Marker size given to the most populous city of a selection.
    pub circle_scale: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            circle_scale: DEFAULT_CIRCLE_SCALE,
        }
    }
}
