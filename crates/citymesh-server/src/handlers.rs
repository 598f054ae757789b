//! Request handlers for protocol methods.
//!
//! Each handler implements one method and runs against the calling
//! connection's own [`Session`].

use crate::protocol::{codes, LocationParams, RebuildParams, RegionParams, Response, RouteParams};
use citymesh_core::{CityRecord, LatLon};
use citymesh_graph::{
    build_snapshot, EdgeView, GraphParams, NameResolver, PopulationView, QueryError, RouteView,
    Session, Snapshot, ViewConfig,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;
use tracing::debug;

/// State shared by every connection. Read-only.
#[derive(Debug)]
pub struct ServerState {
    /// The full dataset, before any filtering.
    pub records: Arc<[CityRecord]>,
    /// Parameters new sessions start with.
    pub params: GraphParams,
    pub view: ViewConfig,
    pub resolver: NameResolver,
}

pub type SharedState = Arc<ServerState>;

impl ServerState {
    /// Builds a session with the default parameters on the blocking pool.
    pub async fn open_session(&self) -> Result<Session, JoinError> {
        let snapshot = build_in_background(Arc::clone(&self.records), self.params).await?;
        Ok(Session::from_snapshot(snapshot))
    }
}

async fn build_in_background(
    records: Arc<[CityRecord]>,
    params: GraphParams,
) -> Result<Snapshot, JoinError> {
    tokio::task::spawn_blocking(move || build_snapshot(&records, params)).await
}

fn query_error(id: Option<Value>, err: QueryError) -> Response {
    let code = match err {
        QueryError::SourceNotFound(_) => codes::SOURCE_NOT_FOUND,
        QueryError::DestinationNotFound(_) => codes::DESTINATION_NOT_FOUND,
        QueryError::NoPath { .. } => codes::NO_PATH,
        QueryError::NoLocation => codes::NO_LOCATION,
        QueryError::UnknownNode(_) => codes::UNKNOWN_NODE,
    };
    Response::error(id, code, err.to_string())
}

/// The explicit centre of a region query, else the session's location.
///
/// A centre must give both coordinates, in range.
fn region_center(
    session: &Session,
    id: &Option<Value>,
    params: &RegionParams,
) -> Result<LatLon, Response> {
    let explicit = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => {
            let center = LatLon::new(lat, lon);
            if !center.is_valid() {
                return Err(Response::invalid_params(id.clone(), "Coordinates out of range"));
            }
            Some(center)
        }
        (None, None) => None,
        _ => {
            return Err(Response::invalid_params(
                id.clone(),
                "lat and lon must be given together",
            ))
        }
    };
    session.center(explicit).map_err(|e| query_error(id.clone(), e))
}

/// Handles the graph.info method.
pub fn handle_info(session: &Session, id: Option<Value>) -> Response {
    let graph = session.graph();
    let params = graph.params();

    #[derive(Serialize)]
    struct InfoResult {
        #[serde(rename = "nodeCount")]
        node_count: usize,
        #[serde(rename = "edgeCount")]
        edge_count: usize,
        params: GraphParams,
        location: Option<LatLon>,
        version: &'static str,
    }

    Response::success(
        id,
        InfoResult {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            params,
            location: session.location(),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Handles the graph.stats method.
pub fn handle_stats(session: &Session, id: Option<Value>) -> Response {
    let start = Instant::now();
    let stats = session.graph().stats();

    Response::success(
        id,
        serde_json::json!({
            "stats": stats,
            "queryTime": start.elapsed().as_millis() as u64
        }),
    )
}

/// Handles the graph.rebuild method.
///
/// The build runs on the blocking pool; the session only switches to the
/// new graph once it is complete.
pub async fn handle_rebuild(
    session: &mut Session,
    state: SharedState,
    id: Option<Value>,
    params: RebuildParams,
) -> Response {
    if !(params.max_distance.is_finite() && params.max_distance > 0.0) {
        return Response::invalid_params(id, "maxDistance must be a positive number");
    }

    let start = Instant::now();
    let graph_params = GraphParams::new(params.max_distance, params.min_population);

    let snapshot = match build_in_background(Arc::clone(&state.records), graph_params).await {
        Ok(snapshot) => snapshot,
        Err(e) => return Response::error(id, codes::BUILD_FAILED, e.to_string()),
    };
    session.replace_snapshot(snapshot);

    let graph = session.graph();
    Response::success(
        id,
        serde_json::json!({
            "nodeCount": graph.node_count(),
            "edgeCount": graph.edge_count(),
            "buildTime": start.elapsed().as_millis() as u64
        }),
    )
}

/// Handles the session.setLocation method.
pub fn handle_set_location(
    session: &mut Session,
    id: Option<Value>,
    params: LocationParams,
) -> Response {
    let location = LatLon::new(params.lat, params.lon);
    if !location.is_valid() {
        return Response::invalid_params(id, "Coordinates out of range");
    }

    session.set_location(location);
    Response::success(id, serde_json::json!({ "location": location }))
}

/// Handles the region.nodes method.
pub fn handle_region_nodes(
    session: &Session,
    state: &ServerState,
    id: Option<Value>,
    params: RegionParams,
) -> Response {
    let center = match region_center(session, &id, &params) {
        Ok(center) => center,
        Err(response) => return response,
    };
    let graph = session.graph();

    debug!("Region nodes around {:?} within {} km", center, params.radius);

    let nodes: Vec<_> = graph
        .nodes_within(center, params.radius)
        .into_iter()
        .map(|(city, population)| serde_json::json!({ "id": city, "population": population }))
        .collect();
    let view = PopulationView::around(graph, center, params.radius, &state.view);

    Response::success(
        id,
        serde_json::json!({
            "nodes": nodes,
            "view": view
        }),
    )
}

/// Handles the region.edges method.
pub fn handle_region_edges(session: &Session, id: Option<Value>, params: RegionParams) -> Response {
    let center = match region_center(session, &id, &params) {
        Ok(center) => center,
        Err(response) => return response,
    };
    let graph = session.graph();

    debug!("Region edges around {:?} within {} km", center, params.radius);

    Response::success(
        id,
        serde_json::json!({
            "edges": graph.edges_within(center, params.radius),
            "view": EdgeView::around(graph, center, params.radius)
        }),
    )
}

/// Handles the route method.
pub fn handle_route(
    session: &Session,
    state: &ServerState,
    id: Option<Value>,
    params: RouteParams,
) -> Response {
    let start = Instant::now();
    let graph = session.graph();

    debug!("Route: {} -> {}", params.source, params.destination);

    match graph.route(&state.resolver, &params.source, &params.destination) {
        Ok(route) => {
            let view = RouteView::from_route(graph, &route);
            Response::success(
                id,
                serde_json::json!({
                    "route": route,
                    "view": view,
                    "queryTime": start.elapsed().as_millis() as u64
                }),
            )
        }
        Err(e) => query_error(id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> ServerState {
        let records: Vec<CityRecord> = vec![
            CityRecord::new("A", "aa", "1", 200_000, LatLon::new(0.0, 0.0)),
            CityRecord::new("B", "bb", "1", 150_000, LatLon::new(0.0, 1.0)),
            CityRecord::new("C", "cc", "1", 50_000, LatLon::new(10.0, 10.0)),
        ];
        ServerState {
            records: records.into(),
            params: GraphParams::new(150.0, 100_000),
            view: ViewConfig::default(),
            resolver: NameResolver::new(),
        }
    }

    fn new_session(state: &ServerState) -> Session {
        Session::new(&state.records, state.params)
    }

    fn result(response: Response) -> Value {
        assert!(response.error.is_none(), "unexpected error: {:?}", response.error);
        response.result.unwrap()
    }

    fn error_code(response: Response) -> i32 {
        response.error.expect("expected an error").code
    }

    #[test]
    fn test_info() {
        let state = state();
        let session = new_session(&state);
        let info = result(handle_info(&session, Some(json!(1))));
        assert_eq!(info["nodeCount"], 2);
        assert_eq!(info["edgeCount"], 1);
        assert_eq!(info["params"]["minPopulation"], 100_000);
    }

    #[test]
    fn test_region_needs_a_center() {
        let state = state();
        let mut session = new_session(&state);
        let params = RegionParams {
            radius: 200.0,
            lat: None,
            lon: None,
        };

        let response = handle_region_nodes(&session, &state, None, params.clone());
        assert_eq!(error_code(response), codes::NO_LOCATION);

        handle_set_location(&mut session, None, LocationParams { lat: 0.0, lon: 0.5 });
        let nodes = result(handle_region_nodes(&session, &state, None, params.clone()));
        assert_eq!(nodes["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(nodes["view"]["markers"][0]["size"], 15.0);

        let edges = result(handle_region_edges(&session, None, params));
        assert_eq!(edges["edges"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_region_rejects_half_a_center() {
        let state = state();
        let mut session = new_session(&state);
        handle_set_location(&mut session, None, LocationParams { lat: 0.0, lon: 0.5 });

        let lat_only = RegionParams {
            radius: 200.0,
            lat: Some(60.0),
            lon: None,
        };
        let response = handle_region_nodes(&session, &state, None, lat_only);
        assert_eq!(error_code(response), codes::INVALID_PARAMS);

        let lon_only = RegionParams {
            radius: 200.0,
            lat: None,
            lon: Some(0.5),
        };
        let response = handle_region_edges(&session, None, lon_only);
        assert_eq!(error_code(response), codes::INVALID_PARAMS);
    }

    #[test]
    fn test_region_rejects_out_of_range_center() {
        let state = state();
        let session = new_session(&state);
        let params = RegionParams {
            radius: 200.0,
            lat: Some(500.0),
            lon: Some(0.0),
        };

        let response = handle_region_nodes(&session, &state, None, params.clone());
        assert_eq!(error_code(response), codes::INVALID_PARAMS);
        let response = handle_region_edges(&session, None, params);
        assert_eq!(error_code(response), codes::INVALID_PARAMS);
    }

    #[test]
    fn test_explicit_center_overrides_location() {
        let state = state();
        let mut session = new_session(&state);
        handle_set_location(&mut session, None, LocationParams { lat: 60.0, lon: 60.0 });

        let params = RegionParams {
            radius: 200.0,
            lat: Some(0.0),
            lon: Some(0.5),
        };
        let nodes = result(handle_region_nodes(&session, &state, None, params));
        assert_eq!(nodes["nodes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_set_location_rejects_bad_coordinates() {
        let state = state();
        let mut session = new_session(&state);
        let response = handle_set_location(&mut session, None, LocationParams { lat: 95.0, lon: 0.0 });
        assert_eq!(error_code(response), codes::INVALID_PARAMS);
        assert!(session.location().is_none());
    }

    #[test]
    fn test_route_errors() {
        let state = state();
        let session = new_session(&state);

        let ok = result(handle_route(
            &session,
            &state,
            None,
            RouteParams {
                source: "A, aa".into(),
                destination: "B, bb".into(),
            },
        ));
        assert_eq!(ok["route"]["cities"], json!(["A, aa; 1", "B, bb; 1"]));
        assert_eq!(ok["view"]["stops"].as_array().unwrap().len(), 2);

        let missing_source = handle_route(
            &session,
            &state,
            None,
            RouteParams {
                source: "Zzzzzz".into(),
                destination: "B, bb".into(),
            },
        );
        assert_eq!(error_code(missing_source), codes::SOURCE_NOT_FOUND);

        let missing_destination = handle_route(
            &session,
            &state,
            None,
            RouteParams {
                source: "A, aa".into(),
                destination: "Zzzzzz".into(),
            },
        );
        assert_eq!(error_code(missing_destination), codes::DESTINATION_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rebuild_only_touches_own_session() {
        let state = Arc::new(state());
        let mut mine = state.open_session().await.unwrap();
        let other = state.open_session().await.unwrap();

        let response = handle_rebuild(
            &mut mine,
            Arc::clone(&state),
            None,
            RebuildParams {
                max_distance: 150.0,
                min_population: 0,
            },
        )
        .await;
        assert_eq!(result(response)["nodeCount"], 3);

        assert_eq!(mine.graph().node_count(), 3);
        assert_eq!(other.graph().node_count(), 2);
        assert_eq!(other.params().min_population, 100_000);
    }

    #[tokio::test]
    async fn test_rebuild_rejects_non_positive_distance() {
        let state = Arc::new(state());
        let mut session = new_session(&state);

        let response = handle_rebuild(
            &mut session,
            state,
            None,
            RebuildParams {
                max_distance: 0.0,
                min_population: 0,
            },
        )
        .await;
        assert_eq!(error_code(response), codes::INVALID_PARAMS);
    }
}
