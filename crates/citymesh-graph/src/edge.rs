//! Edge types for the city graph.
//!
//! Every edge is an undirected link between two cities that lie within the
//! graph's distance threshold of each other.

use serde::{Deserialize, Serialize};

/// The weight stored on each graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Great-circle distance between the endpoints, in kilometres.
    pub distance_km: f64,
}

impl Link {
    pub fn new(distance_km: f64) -> Self {
        Self { distance_km }
    }
}

/// A simplified edge for export and visualization.
///
/// `source` is always the endpoint that was added to the graph first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub distance_km: f64,
}
