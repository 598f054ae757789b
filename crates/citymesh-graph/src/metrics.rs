//! Structural metrics: counts and connected components.

use crate::graph::CityGraph;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Graph statistics for the info endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub component_count: usize,
}

impl CityGraph {
    /// Number of connected components. An isolated city is a component.
    pub fn component_count(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    /// The connected components as lists of city ids.
    ///
    /// Ids inside a component are sorted, and components are ordered by
    /// size (largest first) then by their smallest id, so the result does
    /// not depend on the order cities were inserted in.
    pub fn components(&self) -> Vec<Vec<String>> {
        let mut sets = UnionFind::<usize>::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut groups: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for index in self.graph.node_indices() {
            groups
                .entry(sets.find(index.index()))
                .or_default()
                .push(self.graph[index].id.clone());
        }

        let mut components: Vec<Vec<String>> = groups
            .into_values()
            .map(|mut ids| {
                ids.sort();
                ids
            })
            .collect();

        components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
        components
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            component_count: self.component_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::GraphBuilder;
    use crate::params::GraphParams;
    use citymesh_core::{CityRecord, LatLon};

    fn records() -> Vec<CityRecord> {
        vec![
            CityRecord::new("A", "xx", "1", 10, LatLon::new(0.0, 0.0)),
            CityRecord::new("B", "xx", "1", 10, LatLon::new(0.0, 1.0)),
            CityRecord::new("C", "xx", "1", 10, LatLon::new(0.0, 2.0)),
            CityRecord::new("D", "xx", "1", 10, LatLon::new(30.0, 30.0)),
            CityRecord::new("E", "xx", "1", 10, LatLon::new(30.0, 30.5)),
            CityRecord::new("F", "xx", "1", 10, LatLon::new(-45.0, 100.0)),
        ]
    }

    #[test]
    fn test_stats() {
        let mut builder = GraphBuilder::new(GraphParams::new(150.0, 0));
        builder.add_records(&records());
        let stats = builder.build().stats();

        assert_eq!(stats.node_count, 6);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.component_count, 3);
    }

    #[test]
    fn test_components_listing() {
        let mut builder = GraphBuilder::new(GraphParams::new(150.0, 0));
        builder.add_records(&records());
        let components = builder.build().components();

        assert_eq!(
            components,
            vec![
                vec!["A, xx; 1", "B, xx; 1", "C, xx; 1"],
                vec!["D, xx; 1", "E, xx; 1"],
                vec!["F, xx; 1"],
            ]
        );
    }

    #[test]
    fn test_component_count_ignores_insertion_order() {
        let forward = records();
        let mut backward = records();
        backward.reverse();

        let build = |records: &[CityRecord]| {
            let mut builder = GraphBuilder::new(GraphParams::new(150.0, 0));
            builder.add_records(records);
            builder.build()
        };

        let a = build(&forward);
        let b = build(&backward);
        assert_eq!(a.component_count(), b.component_count());
        assert_eq!(a.components(), b.components());
    }

    #[test]
    fn test_empty_graph_has_no_components() {
        let graph = GraphBuilder::default().build();
        assert_eq!(graph.component_count(), 0);
        assert!(graph.components().is_empty());
    }
}
