//! Citymesh Graph - City proximity graph and queries
//!
//! This crate builds an undirected graph of cities in which every pair no
//! farther apart than a distance threshold is linked, and answers
//! questions about it: counts and components, which cities and links lie
//! around a point, and the shortest route between two cities named in
//! free text.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with additional indexes for:
//! - Id lookups
//! - Radius search (a 3-D k-d tree over projected coordinates)
//!
//! Graphs are immutable once built. A [`Session`] holds the current
//! [`Snapshot`] and swaps in a new one when its parameters change.
//!
//! # Example
//!
//! ```
//! use citymesh_core::{CityRecord, LatLon};
//! use citymesh_graph::{GraphBuilder, GraphParams, NameResolver};
//!
//! let records = vec![
//!     CityRecord::new("A", "xx", "r", 200_000, LatLon::new(0.0, 0.0)),
//!     CityRecord::new("B", "xx", "r", 150_000, LatLon::new(0.0, 1.0)),
//! ];
//!
//! let mut builder = GraphBuilder::new(GraphParams::new(150.0, 100_000));
//! builder.add_records(&records);
//! let graph = builder.build();
//!
//! assert_eq!(graph.edge_count(), 1);
//! let route = graph.route(&NameResolver::new(), "A, xx", "B, xx").unwrap();
//! assert_eq!(route.cities, vec!["A, xx; r", "B, xx; r"]);
//! ```

mod builder;
mod edge;
mod error;
mod graph;
mod metrics;
mod params;
mod path;
mod region;
mod resolve;
mod session;
pub mod spatial;
pub mod view;

pub use builder::GraphBuilder;
pub use edge::{GraphLink, Link};
pub use error::{QueryError, Result};
pub use graph::{City, CityGraph, NodeId};
pub use metrics::GraphStats;
pub use params::{
    GraphParams, ViewConfig, DEFAULT_CIRCLE_SCALE, DEFAULT_MAX_DISTANCE_KM, DEFAULT_MIN_POPULATION,
};
pub use path::Route;
pub use resolve::{JaroWinkler, LevenshteinRatio, NameResolver, Similarity, DEFAULT_THRESHOLD};
pub use session::{build_snapshot, Session, Snapshot};
pub use spatial::KdTree;
pub use view::{EdgeView, Marker, PopulationView, RouteView};
