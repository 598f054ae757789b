//! Shortest routes between cities.
//!
//! Edge weights are great-circle distances, so the straight great-circle
//! distance to the destination never overestimates the remaining route
//! and serves as the A* heuristic.

use crate::error::{QueryError, Result};
use crate::graph::{CityGraph, NodeId};
use crate::resolve::{NameResolver, Similarity};
use citymesh_core::great_circle_km;
use serde::Serialize;
use tracing::debug;

/// A path through the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Nodes from source to destination, both included.
    #[serde(skip)]
    pub nodes: Vec<NodeId>,
    /// City ids along the route.
    pub cities: Vec<String>,
    /// Sum of edge lengths, in kilometres.
    pub distance_km: f64,
}

impl Route {
    /// Number of edges travelled.
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

impl CityGraph {
    /// Finds the shortest route between two nodes.
    ///
    /// A route from a node to itself is that single node with length 0.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> Result<Route> {
        let source = self
            .get(from)
            .ok_or_else(|| QueryError::UnknownNode(format!("#{}", from.index())))?;
        let target = self
            .get(to)
            .ok_or_else(|| QueryError::UnknownNode(format!("#{}", to.index())))?;
        let goal = target.location;

        let (distance_km, nodes) = petgraph::algo::astar(
            &self.graph,
            from,
            |finish| finish == to,
            |edge| edge.weight().distance_km,
            |node| great_circle_km(self.graph[node].location, goal),
        )
        .ok_or_else(|| QueryError::NoPath {
            from: source.id.clone(),
            to: target.id.clone(),
        })?;

        debug!(
            "Route {} -> {}: {} hops, {:.1} km",
            source.id,
            target.id,
            nodes.len().saturating_sub(1),
            distance_km
        );

        let cities = nodes.iter().map(|idx| self.graph[*idx].id.clone()).collect();
        Ok(Route {
            nodes,
            cities,
            distance_km,
        })
    }

    /// Resolves two free-text names and routes between them.
    ///
    /// The source is resolved first: if both names fail, the error names
    /// the source.
    pub fn route<S: Similarity>(
        &self,
        resolver: &NameResolver<S>,
        source: &str,
        destination: &str,
    ) -> Result<Route> {
        let from = resolver
            .resolve(self, source)
            .ok_or_else(|| QueryError::SourceNotFound(source.to_string()))?;
        let to = resolver
            .resolve(self, destination)
            .ok_or_else(|| QueryError::DestinationNotFound(destination.to_string()))?;

        self.shortest_path(from, to)
    }
}
