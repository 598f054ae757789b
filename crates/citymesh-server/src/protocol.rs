//! JSON-RPC 2.0 message types and method parameters.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error codes beyond the JSON-RPC reserved range.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub const SOURCE_NOT_FOUND: i32 = -32001;
    pub const DESTINATION_NOT_FOUND: i32 = -32002;
    pub const NO_PATH: i32 = -32003;
    pub const NO_LOCATION: i32 = -32004;
    pub const UNKNOWN_NODE: i32 = -32005;
    pub const BUILD_FAILED: i32 = -32010;
}

/// An incoming request.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// An error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

/// An outgoing response. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: Option<Value>, result: impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self {
                jsonrpc: "2.0".into(),
                id,
                result: Some(value),
                error: None,
            },
            Err(e) => Self::error(id, codes::INTERNAL_ERROR, e.to_string()),
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn parse_error() -> Self {
        Self::error(None, codes::PARSE_ERROR, "Parse error")
    }

    pub fn invalid_params(id: Option<Value>, message: impl Into<String>) -> Self {
        Self::error(id, codes::INVALID_PARAMS, message)
    }

    /// Whether this response failed with `code`.
    pub fn has_error(&self, code: i32) -> bool {
        self.error.as_ref().map(|e| e.code) == Some(code)
    }

    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::error(
            id,
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }
}

/// Parameters for `graph.rebuild`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildParams {
    pub max_distance: f64,
    pub min_population: u64,
}

/// Parameters for `session.setLocation`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationParams {
    pub lat: f64,
    pub lon: f64,
}

/// Parameters for `region.nodes` and `region.edges`.
///
/// Without `lat`/`lon` the session's location is the centre.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionParams {
    pub radius: f64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Parameters for `route`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteParams {
    pub source: String,
    pub destination: String,
}
