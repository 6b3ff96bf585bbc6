//! Hub and router tests through the async handles.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use connect_four_server::server::{build_router, spawn_hub};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;
use tower::ServiceExt;

async fn next_frame(rx: &mut UnboundedReceiver<String>) -> serde_json::Value {
    let frame = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("channel closed");
    serde_json::from_str(&frame).unwrap()
}

#[tokio::test]
async fn two_clients_play_through_the_hub() {
    let (hub, _task) = spawn_hub(None);
    let (x, mut rx_x) = hub.connect();
    let (y, mut rx_y) = hub.connect();
    assert_ne!(x, y);

    hub.message(x, r#"{"event":"join","data":{"room":"A"}}"#.into());
    assert_eq!(next_frame(&mut rx_x).await["data"]["me"], 1);
    assert_eq!(next_frame(&mut rx_x).await["data"]["status"], "waiting");

    hub.message(y, r#"{"event":"join","data":{"room":"A"}}"#.into());
    assert_eq!(next_frame(&mut rx_y).await["data"]["me"], 2);
    assert_eq!(next_frame(&mut rx_y).await["data"]["status"], "playing");
    assert_eq!(next_frame(&mut rx_x).await["data"]["status"], "playing");

    hub.message(y, r#"{"event":"move","data":{"room":"A","col":0}}"#.into());
    let err = next_frame(&mut rx_y).await;
    assert_eq!(err["event"], "error_msg");
    assert_eq!(err["data"], "Not your turn");

    hub.disconnect(x);
    let state = next_frame(&mut rx_y).await;
    assert_eq!(state["event"], "state");
    assert_eq!(state["data"]["status"], "waiting");
    assert!(state["data"]["players"]["p1"].is_null());
}

#[tokio::test]
async fn idle_rooms_are_evicted() {
    let (hub, _task) = spawn_hub(Some(connect_four_server::server::EvictionPolicy {
        max_idle: Duration::from_millis(10),
        interval: Duration::from_millis(20),
    }));
    let (x, mut rx_x) = hub.connect();
    hub.message(x, r#"{"event":"join","data":{"room":"A"}}"#.into());
    next_frame(&mut rx_x).await;
    next_frame(&mut rx_x).await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    // Without eviction the same connection would take seat 2; the room is
    // gone, so the join starts a fresh room instead.
    hub.message(x, r#"{"event":"join","data":{"room":"A"}}"#.into());
    assert_eq!(next_frame(&mut rx_x).await["data"]["me"], 1);
}

#[tokio::test]
async fn health_endpoint() {
    let (hub, _task) = spawn_hub(None);
    let response = build_router(hub)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["rooms"], 0);
    assert_eq!(json["connections"], 0);
}

#[tokio::test]
async fn health_reports_room_counts() {
    let (hub, _task) = spawn_hub(None);
    let (x, mut rx_x) = hub.connect();
    let (y, mut rx_y) = hub.connect();
    let (_idle, _rx_idle) = hub.connect();
    for (conn, rx) in [(x, &mut rx_x), (y, &mut rx_y)] {
        hub.message(conn, r#"{"event":"join","data":{"room":"A"}}"#.into());
        next_frame(rx).await;
    }
    hub.message(x, r#"{"event":"join","data":{"room":"B"}}"#.into());
    next_frame(&mut rx_x).await;

    let response = build_router(hub)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["rooms"], 2);
    assert_eq!(json["playing"], 1);
    assert_eq!(json["connections"], 3);
}
