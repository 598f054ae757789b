//! Graph builder for constructing the city graph from records.
//!
//! The builder takes CityRecords, keeps those above the population
//! threshold, and links every pair within the distance threshold using
//! the spatial index.

use crate::edge::Link;
use crate::graph::{City, CityGraph, NodeId};
use crate::params::GraphParams;
use citymesh_core::{great_circle_km, CityRecord};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

/// Builds a CityGraph from city records.
///
/// The builder handles the two-pass process:
/// 1. Collect cities above the population threshold (last record wins on
///    a repeated id, keeping the position of the first)
/// 2. Index them and link every pair within the distance threshold
pub struct GraphBuilder {
    params: GraphParams,
    cities: Vec<City>,
    /// Maps ids to positions in `cities` for deduplication.
    positions: HashMap<String, usize>,
    /// Records offered, including filtered ones.
    seen: usize,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(GraphParams::default())
    }
}

impl GraphBuilder {
    /// Creates a new builder for the given parameters.
    pub fn new(params: GraphParams) -> Self {
        Self {
            params,
            cities: Vec::new(),
            positions: HashMap::new(),
            seen: 0,
        }
    }

    /// Offers records to the graph.
    ///
    /// Cities with `population <= min_population` are dropped here.
    pub fn add_records<'a>(&mut self, records: impl IntoIterator<Item = &'a CityRecord>) {
        for record in records {
            self.seen += 1;
            if record.population <= self.params.min_population {
                continue;
            }

            let city = City::from(record);
            match self.positions.get(&city.id) {
                Some(&pos) => {
                    debug!("Duplicate city id {}, keeping the later record", city.id);
                    self.cities[pos] = city;
                }
                None => {
                    self.positions.insert(city.id.clone(), self.cities.len());
                    self.cities.push(city);
                }
            }
        }
    }

    /// Finishes building and returns the graph.
    pub fn build(self) -> CityGraph {
        let start = Instant::now();
        let max_distance = self.params.max_distance_km;

        let mut graph = CityGraph::with_params(self.params);
        for city in self.cities {
            graph.add_node(city);
        }
        graph.index_nodes();

        // Collect first: the index borrows the graph
        let node_indices: Vec<NodeId> = graph.node_indexes().collect();
        let mut links_to_add = Vec::new();

        for from in node_indices {
            let origin = graph.graph[from].location;
            for to in graph.spatial.range_query(origin, max_distance) {
                if to == from {
                    continue;
                }
                // Lower index first so both directions yield the same weight
                let (a, b) = if from < to { (from, to) } else { (to, from) };
                links_to_add.push((a, b));
            }
        }

        let mut added = 0usize;
        for (a, b) in links_to_add {
            let distance = great_circle_km(graph.graph[a].location, graph.graph[b].location);
            if graph.add_link(a, b, Link::new(distance)) {
                added += 1;
            }
        }

        info!(
            "Built graph: {} of {} cities, {} edges (max {} km, min population {}) in {}ms",
            graph.node_count(),
            self.seen,
            added,
            max_distance,
            self.params.min_population,
            start.elapsed().as_millis()
        );

        graph
    }
}
