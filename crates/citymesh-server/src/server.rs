//! WebSocket server implementation.
//!
//! Handles client connections and routes messages to handlers. Every
//! connection gets its own [`Session`]; only the record list is shared.

use crate::handlers::{
    handle_info, handle_rebuild, handle_region_edges, handle_region_nodes, handle_route,
    handle_set_location, handle_stats, ServerState, SharedState,
};
use crate::protocol::{LocationParams, RebuildParams, RegionParams, Request, Response, RouteParams};
use citymesh_core::{read_cities, CityRecord, DatasetError};
use citymesh_graph::{GraphParams, NameResolver, Session, ViewConfig};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Default port for the server.
pub const DEFAULT_PORT: u16 = 7480;

/// Errors that stop the server or a connection.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to load dataset: {0}")]
    Dataset(#[from] DatasetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session build failed: {0}")]
    Build(#[from] tokio::task::JoinError),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub addr: SocketAddr,
    /// City CSV to load.
    pub dataset: PathBuf,
    /// Parameters every new session starts with.
    pub params: GraphParams,
    pub view: ViewConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            dataset: PathBuf::from("worldcitiespop.csv"),
            params: GraphParams::default(),
            view: ViewConfig::default(),
        }
    }
}

/// The Citymesh WebSocket server.
pub struct CitymeshServer {
    addr: SocketAddr,
    state: SharedState,
}

impl CitymeshServer {
    /// Loads the configured dataset and prepares the server.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let records = read_cities(&config.dataset)?;
        Ok(Self::with_records(records, config))
    }

    /// Prepares a server over records that are already loaded.
    pub fn with_records(records: Vec<CityRecord>, config: ServerConfig) -> Self {
        let state = ServerState {
            records: records.into(),
            params: config.params,
            view: config.view,
            resolver: NameResolver::new(),
        };
        Self {
            addr: config.addr,
            state: Arc::new(state),
        }
    }

    /// Number of records shared by all sessions.
    pub fn record_count(&self) -> usize {
        self.state.records.len()
    }

    /// Binds the configured address and serves forever.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(&self.addr).await?;
        self.serve(listener).await
    }

    /// Accepts connections from `listener` forever.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        info!("Citymesh server listening on {}", listener.local_addr()?);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, state).await {
                            error!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handles a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: SharedState,
) -> Result<(), ServerError> {
    let ws_stream = accept_async(stream).await?;
    let session_id = Uuid::new_v4();
    info!("Session {} established with {}", session_id, addr);

    let mut session = state.open_session().await?;
    let (mut write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                warn!("Message error from {}: {}", addr, e);
                break;
            }
        };

        if msg.is_close() {
            debug!("Client {} disconnected", addr);
            break;
        }

        if msg.is_ping() {
            write.send(Message::Pong(msg.into_data())).await?;
            continue;
        }

        if msg.is_text() {
            let text = msg.to_text().unwrap_or("");
            let response = process_message(text, &mut session, Arc::clone(&state)).await;
            let json = serde_json::to_string(&response)?;
            write.send(Message::Text(json)).await?;
        }
    }

    info!("Session {} closed", session_id);
    Ok(())
}

fn parse_params<T: DeserializeOwned>(id: &Option<Value>, params: Value) -> Result<T, Response> {
    serde_json::from_value(params).map_err(|e| Response::invalid_params(id.clone(), e.to_string()))
}

/// Processes a JSON-RPC message against a session and returns a response.
pub async fn process_message(text: &str, session: &mut Session, state: SharedState) -> Response {
    let request: Request = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(_) => return Response::parse_error(),
    };

    let id = request.id.clone();
    let method = request.method.as_str();

    debug!("Processing method: {}", method);

    match method {
        "graph.info" => handle_info(session, id),

        "graph.stats" => handle_stats(session, id),

        "graph.rebuild" => match parse_params::<RebuildParams>(&id, request.params) {
            Ok(params) => handle_rebuild(session, state, id, params).await,
            Err(response) => response,
        },

        "session.setLocation" => match parse_params::<LocationParams>(&id, request.params) {
            Ok(params) => handle_set_location(session, id, params),
            Err(response) => response,
        },

        "region.nodes" => match parse_params::<RegionParams>(&id, request.params) {
            Ok(params) => handle_region_nodes(session, &state, id, params),
            Err(response) => response,
        },

        "region.edges" => match parse_params::<RegionParams>(&id, request.params) {
            Ok(params) => handle_region_edges(session, id, params),
            Err(response) => response,
        },

        "route" => match parse_params::<RouteParams>(&id, request.params) {
            Ok(params) => handle_route(session, &state, id, params),
            Err(response) => response,
        },

        _ => Response::method_not_found(id, method),
    }
}
