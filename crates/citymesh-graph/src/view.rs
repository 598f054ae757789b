//! Plain data for map renderers.
//!
//! Drawing is someone else's job. These views carry exactly what a
//! renderer needs: segments for edges, sized markers for populations,
//! and an ordered list of stops for a route. Coordinates stay in
//! latitude/longitude order.

use crate::graph::CityGraph;
use crate::params::ViewConfig;
use crate::path::Route;
use citymesh_core::LatLon;
use serde::Serialize;

/// A straight segment between two cities.
pub type Segment = [LatLon; 2];

/// Edges around a point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EdgeView {
    pub segments: Vec<Segment>,
}

impl EdgeView {
    /// All edges with both endpoints within `radius_km` of `center`.
    pub fn around(graph: &CityGraph, center: LatLon, radius_km: f64) -> Self {
        let segments = graph
            .edge_indexes_within(center, radius_km)
            .into_iter()
            .map(|(a, b)| [graph.graph[a].location, graph.graph[b].location])
            .collect();
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A city marker sized by population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub location: LatLon,
    pub size: f64,
}

/// Cities around a point, sized relative to the largest one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulationView {
    pub markers: Vec<Marker>,
}

impl PopulationView {
    /// Markers for the cities within `radius_km` of `center`.
    ///
    /// `size = population * circle_scale / max_population`, where the
    /// maximum is taken over this selection only. A selection whose
    /// largest population is 0 gets size 0 everywhere.
    pub fn around(graph: &CityGraph, center: LatLon, radius_km: f64, config: &ViewConfig) -> Self {
        let selected = graph.node_indexes_within(center, radius_km);
        let max_population = selected
            .iter()
            .map(|idx| graph.graph[*idx].population)
            .max()
            .unwrap_or(0);

        let markers = selected
            .into_iter()
            .map(|idx| {
                let city = &graph.graph[idx];
                let size = if max_population == 0 {
                    0.0
                } else {
                    city.population as f64 * config.circle_scale / max_population as f64
                };
                Marker {
                    location: city.location,
                    size,
                }
            })
            .collect();

        Self { markers }
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// The stops of a route and the legs joining them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteView {
    pub stops: Vec<LatLon>,
    pub segments: Vec<Segment>,
}

impl RouteView {
    pub fn from_route(graph: &CityGraph, route: &Route) -> Self {
        let stops: Vec<LatLon> = route
            .nodes
            .iter()
            .filter_map(|idx| graph.get(*idx))
            .map(|city| city.location)
            .collect();
        let segments = stops.windows(2).map(|w| [w[0], w[1]]).collect();

        Self { stops, segments }
    }
}
