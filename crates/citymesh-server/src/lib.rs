//! Citymesh Server - WebSocket server for city graph sessions
//!
//! Clients speak JSON-RPC 2.0 over a WebSocket. The dataset is loaded
//! once and shared read-only; each connection gets its own session with
//! its own graph, so one client rebuilding with new parameters never
//! disturbs another.
//!
//! Supported methods:
//! - `graph.info`, `graph.stats`, `graph.rebuild`
//! - `session.setLocation`
//! - `region.nodes`, `region.edges`
//! - `route`

mod handlers;
mod protocol;
mod server;

pub use handlers::{ServerState, SharedState};
pub use protocol::{codes, Request, Response, RpcError};
pub use server::{process_message, CitymeshServer, ServerConfig, ServerError, DEFAULT_PORT};
