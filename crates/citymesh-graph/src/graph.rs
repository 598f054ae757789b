//! Core graph data structure.
//!
//! The CityGraph wraps a petgraph undirected graph and adds an id index
//! and the spatial index over its nodes. It is assembled by
//! [`GraphBuilder`](crate::GraphBuilder) and read-only from then on, so a
//! single instance can be shared between any number of readers.

use crate::edge::{GraphLink, Link};
use crate::params::GraphParams;
use crate::spatial::KdTree;
use citymesh_core::{CityRecord, LatLon};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// A city as stored in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// `"name, country; region"`.
    pub id: String,
    /// `"name, country"`, the text name lookups are scored against.
    pub label: String,
    pub population: u64,
    pub location: LatLon,
}

impl From<&CityRecord> for City {
    fn from(record: &CityRecord) -> Self {
        Self {
            id: record.id(),
            label: record.label(),
            population: record.population,
            location: record.location,
        }
    }
}

/// The city proximity graph.
///
/// Nodes are cities above the population threshold; an edge joins every
/// pair no farther apart than the distance threshold and carries that
/// distance. The spatial index always holds exactly the graph's nodes.
#[derive(Debug)]
pub struct CityGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: UnGraph<City, Link>,

    /// Maps string IDs to graph node indexes.
    id_index: HashMap<String, NodeId>,

    /// Radius search over node locations.
    pub(crate) spatial: KdTree<NodeId>,

    /// Parameters this graph was built for.
    params: GraphParams,
}

impl CityGraph {
    pub(crate) fn with_params(params: GraphParams) -> Self {
        Self {
            graph: UnGraph::default(),
            id_index: HashMap::new(),
            spatial: KdTree::default(),
            params,
        }
    }

    /// Adds a city node. Ids are expected to be unique.
    pub(crate) fn add_node(&mut self, city: City) -> NodeId {
        let id = city.id.clone();
        let index = self.graph.add_node(city);
        self.id_index.insert(id, index);
        index
    }

    /// Links two distinct nodes.
    ///
    /// Returns false if the pair is already linked (in either direction) or
    /// if `a == b`; the existing edge is left untouched.
    pub(crate) fn add_link(&mut self, a: NodeId, b: NodeId, link: Link) -> bool {
        if a == b || self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, link);
        true
    }

    /// Indexes all current nodes. Called once, after the last node is added.
    pub(crate) fn index_nodes(&mut self) {
        let points = self
            .graph
            .node_indices()
            .map(|idx| (idx, self.graph[idx].location))
            .collect();
        self.spatial = KdTree::build(points);
    }

    /// The parameters the graph was built with.
    pub fn params(&self) -> GraphParams {
        self.params
    }

    /// Gets a node by its string ID.
    pub fn get_by_id(&self, id: &str) -> Option<&City> {
        let index = self.id_index.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Gets a node by its graph index.
    pub fn get(&self, index: NodeId) -> Option<&City> {
        self.graph.node_weight(index)
    }

    /// Gets the node index for a string ID.
    pub fn get_index(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &City> {
        self.graph.node_weights()
    }

    /// Iterates over all node indexes.
    pub fn node_indexes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Neighbouring nodes with the length of the connecting edge.
    pub fn neighbors(&self, index: NodeId) -> Vec<(NodeId, f64)> {
        self.graph
            .edges(index)
            .map(|edge| {
                let other = if edge.source() == index {
                    edge.target()
                } else {
                    edge.source()
                };
                (other, edge.weight().distance_km)
            })
            .collect()
    }

    /// Length of the edge between two nodes, if they are linked.
    pub fn distance(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge).map(|link| link.distance_km)
    }

    /// Returns all edges with source and target IDs for export.
    pub fn links(&self) -> Vec<GraphLink> {
        self.graph
            .edge_references()
            .map(|edge| self.export_link(edge.source(), edge.target(), edge.weight()))
            .collect()
    }

    pub(crate) fn export_link(&self, a: NodeId, b: NodeId, link: &Link) -> GraphLink {
        GraphLink {
            source: self.graph[a].id.clone(),
            target: self.graph[b].id.clone(),
            distance_km: link.distance_km,
        }
    }

    /// Number of points held by the spatial index.
    pub fn indexed_count(&self) -> usize {
        self.spatial.len()
    }
}
