//! Per-session query context.
//!
//! A session owns the graph its queries run against plus an optional
//! "current location" used when a region query gives no centre. Graphs are
//! shared as [`Snapshot`]s: changing the parameters builds a new graph and
//! swaps the session's handle, while anyone still holding the old snapshot
//! keeps reading it undisturbed.

use crate::builder::GraphBuilder;
use crate::error::{QueryError, Result};
use crate::graph::CityGraph;
use crate::params::GraphParams;
use citymesh_core::{CityRecord, LatLon};
use std::sync::Arc;
use tracing::info;

/// An immutable, shareable graph.
pub type Snapshot = Arc<CityGraph>;

/// Builds a snapshot from records.
pub fn build_snapshot(records: &[CityRecord], params: GraphParams) -> Snapshot {
    let mut builder = GraphBuilder::new(params);
    builder.add_records(records);
    Arc::new(builder.build())
}

/// Query context for one client.
#[derive(Debug, Clone)]
pub struct Session {
    snapshot: Snapshot,
    location: Option<LatLon>,
}

impl Session {
    /// Starts a session with a freshly built graph and no location.
    pub fn new(records: &[CityRecord], params: GraphParams) -> Self {
        Self::from_snapshot(build_snapshot(records, params))
    }

    /// Starts a session on an existing snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            location: None,
        }
    }

    /// Replaces the session's graph with one built for `params`.
    ///
    /// The location survives a rebuild.
    pub fn rebuild(&mut self, records: &[CityRecord], params: GraphParams) {
        info!(
            "Rebuilding session graph (max {} km, min population {})",
            params.max_distance_km, params.min_population
        );
        self.replace_snapshot(build_snapshot(records, params));
    }

    /// Switches the session to a graph built elsewhere.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }

    /// The graph queries should run against.
    pub fn graph(&self) -> &CityGraph {
        &self.snapshot
    }

    /// A handle to the current graph that outlives later rebuilds.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.snapshot)
    }

    pub fn params(&self) -> GraphParams {
        self.snapshot.params()
    }

    pub fn set_location(&mut self, location: LatLon) {
        self.location = Some(location);
    }

    pub fn location(&self) -> Option<LatLon> {
        self.location
    }

    /// The explicit centre if given, else the session's location.
    pub fn center(&self, explicit: Option<LatLon>) -> Result<LatLon> {
        explicit.or(self.location).ok_or(QueryError::NoLocation)
    }
}
