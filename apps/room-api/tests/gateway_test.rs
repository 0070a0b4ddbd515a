mod common;

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::time;
use tokio_tungstenite::tungstenite;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Helper: start an actual TCP server for WebSocket testing.
/// Returns (addr, state). The server runs in the background.
async fn start_ws_server() -> (SocketAddr, room_api::AppState) {
    let state = common::test_state();
    let app = room_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Helper: create a room over HTTP and return its code.
async fn create_room_http(addr: SocketAddr, participant: &str) -> String {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/v1/rooms"))
        .header("authorization", common::bearer(participant))
        .json(&serde_json::json!({ "candidates": common::sample_candidates() }))
        .send()
        .await
        .expect("create room request");
    assert_eq!(resp.status(), 201);

    let body: serde_json::Value = resp.json().await.expect("parse room");
    body["code"].as_str().expect("room code").to_string()
}

async fn join_room_http(addr: SocketAddr, code: &str, participant: &str) {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/v1/rooms/{code}/join"))
        .header("authorization", common::bearer(participant))
        .send()
        .await
        .expect("join request");
    assert_eq!(resp.status(), 200);
}

async fn swipe_http(addr: SocketAddr, code: &str, participant: &str, candidate: &str, decision: &str) {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/v1/rooms/{code}/swipes"))
        .header("authorization", common::bearer(participant))
        .json(&serde_json::json!({ "candidate_id": candidate, "decision": decision }))
        .send()
        .await
        .expect("swipe request");
    assert_eq!(resp.status(), 200);
}

/// Helper: connect to the gateway and send IDENTIFY for a room.
/// Returns the WebSocket stream after asserting READY.
async fn connect_and_identify(addr: SocketAddr, code: &str, participant: &str) -> WsStream {
    let url = format!("ws://{addr}/gateway");
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");

    let (mut write, mut read) = ws_stream.split();

    let identify = serde_json::json!({
        "op": 2,
        "d": { "room_code": code, "participant_id": participant }
    });
    write
        .send(tungstenite::Message::Text(identify.to_string().into()))
        .await
        .expect("send identify");

    let ready = next_message(&mut read).await;
    assert_eq!(ready["op"], 0, "READY should be op=0 (DISPATCH)");
    assert_eq!(ready["t"], "READY");
    assert!(ready["s"].as_u64().unwrap() > 0);
    assert_eq!(ready["d"]["room"]["code"], code);
    assert!(ready["d"]["session_id"]
        .as_str()
        .unwrap()
        .starts_with("gw_"));
    assert!(ready["d"]["heartbeat_interval"].as_u64().unwrap() > 0);

    read.reunite(write).expect("reunite")
}

/// Read the next text message within a timeout and parse it.
async fn next_message<S>(read: &mut S) -> serde_json::Value
where
    S: StreamExt<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
{
    let msg = time::timeout(Duration::from_secs(5), read.next())
        .await
        .expect("timeout waiting for message")
        .expect("stream ended")
        .expect("ws read error");

    let text = msg.into_text().expect("not text");
    serde_json::from_str(&text).expect("parse message")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn gateway_identify_returns_ready_with_the_full_room() {
    let (addr, _state) = start_ws_server().await;
    let code = create_room_http(addr, "alice").await;

    let ws = connect_and_identify(addr, &code, "alice").await;
    drop(ws);
}

#[tokio::test]
async fn gateway_identify_accepts_lowercase_codes() {
    let (addr, _state) = start_ws_server().await;
    let code = create_room_http(addr, "alice").await;

    let url = format!("ws://{addr}/gateway");
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    let (mut write, mut read) = ws_stream.split();

    let identify = serde_json::json!({
        "op": 2,
        "d": { "room_code": code.to_lowercase(), "participant_id": "alice" }
    });
    write
        .send(tungstenite::Message::Text(identify.to_string().into()))
        .await
        .expect("send identify");

    let ready = next_message(&mut read).await;
    assert_eq!(ready["t"], "READY");
    assert_eq!(ready["d"]["room"]["code"], code);
}

#[tokio::test]
async fn gateway_unknown_room_is_a_terminal_close() {
    let (addr, _state) = start_ws_server().await;

    let url = format!("ws://{addr}/gateway");
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    let (mut write, mut read) = ws_stream.split();

    let identify = serde_json::json!({
        "op": 2,
        "d": { "room_code": "ZZZZZ", "participant_id": "alice" }
    });
    write
        .send(tungstenite::Message::Text(identify.to_string().into()))
        .await
        .expect("send identify");

    let msg = time::timeout(Duration::from_secs(5), read.next())
        .await
        .expect("timeout waiting for close")
        .expect("stream ended")
        .expect("ws read error");

    match msg {
        tungstenite::Message::Close(Some(frame)) => {
            assert_eq!(frame.reason.as_str(), "Room not found");
        }
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[tokio::test]
async fn gateway_pushes_a_full_snapshot_per_mutation() {
    let (addr, _state) = start_ws_server().await;
    let code = create_room_http(addr, "alice").await;

    let mut ws = connect_and_identify(addr, &code, "alice").await;

    // A join committed after subscribe must be pushed.
    join_room_http(addr, &code, "bob").await;

    let event = next_message(&mut ws).await;
    assert_eq!(event["t"], "MEMBER_JOIN");
    assert_eq!(
        event["d"]["participants"],
        serde_json::json!(["alice", "bob"])
    );
    // Full document, not a delta.
    assert!(event["d"]["swipes"].is_object());
    assert!(event["d"]["candidates"].is_array());

    // Swipes dispatch one snapshot each; the final approval also commits
    // a match and dispatches again.
    swipe_http(addr, &code, "alice", "golden-spoon", "approve").await;
    swipe_http(addr, &code, "bob", "golden-spoon", "approve").await;

    let mut seqs = vec![event["s"].as_u64().unwrap()];
    let mut saw_match_create = false;
    for _ in 0..3 {
        let event = next_message(&mut ws).await;
        seqs.push(event["s"].as_u64().unwrap());
        if event["t"] == "MATCH_CREATE" {
            assert_eq!(event["d"]["matches"], serde_json::json!(["golden-spoon"]));
            saw_match_create = true;
            break;
        }
        assert_eq!(event["t"], "SWIPE_RECORD");
    }
    assert!(saw_match_create, "expected a MATCH_CREATE dispatch");

    // Per-connection sequence numbers increase monotonically.
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn gateway_does_not_deliver_other_rooms_events() {
    let (addr, _state) = start_ws_server().await;
    let code_a = create_room_http(addr, "alice").await;
    let code_b = create_room_http(addr, "carol").await;

    let mut ws = connect_and_identify(addr, &code_a, "alice").await;

    // Mutate the other room first, then our own.
    join_room_http(addr, &code_b, "dave").await;
    join_room_http(addr, &code_a, "bob").await;

    // The first delivered event must already be our room's join.
    let event = next_message(&mut ws).await;
    assert_eq!(event["t"], "MEMBER_JOIN");
    assert_eq!(event["d"]["code"], code_a);
}

#[tokio::test]
async fn gateway_acknowledges_heartbeats() {
    let (addr, _state) = start_ws_server().await;
    let code = create_room_http(addr, "alice").await;

    let ws = connect_and_identify(addr, &code, "alice").await;
    let (mut write, mut read) = ws.split();

    let heartbeat = serde_json::json!({ "op": 1, "d": { "seq": 5 } });
    write
        .send(tungstenite::Message::Text(heartbeat.to_string().into()))
        .await
        .expect("send heartbeat");

    let ack = next_message(&mut read).await;
    assert_eq!(ack["op"], 6);
    assert_eq!(ack["d"]["ack"], 5);
}
