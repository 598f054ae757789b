//! Radius-bounded selections around an arbitrary point.
//!
//! Nothing matching is not an error: every selection here may be empty.

use crate::edge::GraphLink;
use crate::graph::{CityGraph, NodeId};
use citymesh_core::LatLon;
use petgraph::visit::EdgeRef;
use std::collections::HashSet;

impl CityGraph {
    /// Indexes of the nodes within `radius_km` (great-circle) of `center`,
    /// in ascending order.
    pub fn node_indexes_within(&self, center: LatLon, radius_km: f64) -> Vec<NodeId> {
        let mut found = self.spatial.range_query(center, radius_km);
        found.sort();
        found
    }

    /// Ids and populations of the cities within `radius_km` of `center`.
    pub fn nodes_within(&self, center: LatLon, radius_km: f64) -> Vec<(&str, u64)> {
        self.node_indexes_within(center, radius_km)
            .into_iter()
            .map(|idx| {
                let city = &self.graph[idx];
                (city.id.as_str(), city.population)
            })
            .collect()
    }

    /// Edges whose endpoints both lie within `radius_km` of `center`, as
    /// index pairs with the lower index first.
    ///
    /// An edge with a single endpoint inside is left out even if the
    /// segment passes close to `center`.
    pub fn edge_indexes_within(&self, center: LatLon, radius_km: f64) -> Vec<(NodeId, NodeId)> {
        let inside = self.node_indexes_within(center, radius_km);
        let members: HashSet<NodeId> = inside.iter().copied().collect();

        let mut pairs = Vec::new();
        for &a in &inside {
            for edge in self.graph.edges(a) {
                let b = if edge.source() == a {
                    edge.target()
                } else {
                    edge.source()
                };
                if a < b && members.contains(&b) {
                    pairs.push((a, b));
                }
            }
        }

        pairs.sort();
        pairs
    }

    /// Edges whose endpoints both lie within `radius_km` of `center`.
    pub fn edges_within(&self, center: LatLon, radius_km: f64) -> Vec<GraphLink> {
        self.edge_indexes_within(center, radius_km)
            .into_iter()
            .filter_map(|(a, b)| {
                let edge = self.graph.find_edge(a, b)?;
                Some(self.export_link(a, b, &self.graph[edge]))
            })
            .collect()
    }
}
