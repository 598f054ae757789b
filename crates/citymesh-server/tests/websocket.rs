//! Drives a running server over a real WebSocket.

use citymesh_core::{CityRecord, LatLon};
use citymesh_graph::GraphParams;
use citymesh_server::{codes, CitymeshServer, Response, ServerConfig};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn records() -> Vec<CityRecord> {
    vec![
        CityRecord::new("A", "aa", "1", 200_000, LatLon::new(0.0, 0.0)),
        CityRecord::new("B", "bb", "1", 150_000, LatLon::new(0.0, 1.0)),
        CityRecord::new("C", "cc", "1", 50_000, LatLon::new(10.0, 10.0)),
    ]
}

async fn start() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ServerConfig {
        addr,
        params: GraphParams::new(150.0, 100_000),
        ..ServerConfig::default()
    };
    let server = CitymeshServer::with_records(records(), config);
    tokio::spawn(async move { server.serve(listener).await });
    format!("ws://{}", addr)
}

async fn request(ws: &mut Client, body: Value) -> Response {
    ws.send(Message::Text(body.to_string())).await.unwrap();
    loop {
        let msg = ws.next().await.unwrap().unwrap();
        if msg.is_text() {
            return serde_json::from_str(msg.to_text().unwrap()).unwrap();
        }
    }
}

#[tokio::test]
async fn sessions_rebuild_independently() {
    let url = start().await;
    let (mut first, _) = connect_async(url.as_str()).await.unwrap();
    let (mut second, _) = connect_async(url.as_str()).await.unwrap();

    let rebuilt = request(
        &mut first,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "graph.rebuild",
            "params": {"maxDistance": 150.0, "minPopulation": 0}
        }),
    )
    .await;
    assert_eq!(rebuilt.result.unwrap()["nodeCount"], 3);

    let info = request(
        &mut second,
        json!({"jsonrpc": "2.0", "id": 1, "method": "graph.info"}),
    )
    .await;
    assert_eq!(info.result.unwrap()["nodeCount"], 2);
}

#[tokio::test]
async fn route_over_the_wire() {
    let url = start().await;
    let (mut ws, _) = connect_async(url.as_str()).await.unwrap();

    let found = request(
        &mut ws,
        json!({
            "jsonrpc": "2.0",
            "id": "r1",
            "method": "route",
            "params": {"source": "A, aa", "destination": "B, bb"}
        }),
    )
    .await;
    assert_eq!(found.id, Some(json!("r1")));
    let result = found.result.unwrap();
    assert_eq!(result["route"]["cities"], json!(["A, aa; 1", "B, bb; 1"]));
    assert!((result["route"]["distanceKm"].as_f64().unwrap() - 111.2).abs() < 0.1);

    let missing = request(
        &mut ws,
        json!({
            "jsonrpc": "2.0",
            "id": "r2",
            "method": "route",
            "params": {"source": "A, aa", "destination": "C, cc"}
        }),
    )
    .await;
    assert!(missing.has_error(codes::DESTINATION_NOT_FOUND));
}
