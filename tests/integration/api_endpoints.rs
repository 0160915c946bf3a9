//! Integration tests for API endpoints
//!
//! These tests verify that:
//! - All REST endpoints return correct responses and status codes
//! - Argument and lookup errors surface as 400/404/409 with a JSON body
//! - The WebSocket stream sends a full-state init burst, then live updates

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use futures::StreamExt;
use portwatch::api::{ApiConfig, ApiState, spawn_api_server};
use portwatch::registry::Registry;
use portwatch::storage::{JsonStore, SnapshotStore};
use serde_json::{Value, json};
use tempfile::TempDir;

use super::helpers::*;

// Helper to create a test API server backed by a throwaway store
async fn spawn_test_api() -> (SocketAddr, Arc<Registry>, TempDir) {
    let dir = tempfile::tempdir().unwrap();

    let registry = Arc::new(test_registry());
    let store: Arc<dyn SnapshotStore> = Arc::new(JsonStore::new(dir.path()));

    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(), // random port
        enable_cors: true,
        static_dir: None,
    };

    let addr = spawn_api_server(config, ApiState::new(registry.clone(), store))
        .await
        .unwrap();

    (addr, registry, dir)
}

#[tokio::test]
async fn test_create_and_get_monitor() {
    let (api, registry, _dir) = spawn_test_api().await;
    let (target, target_task) = spawn_target().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{api}/api/monitors"))
        .json(&json!({
            "host": "127.0.0.1",
            "port": target.port(),
            "interval": 50,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    let id = format!("127.0.0.1:{}", target.port());
    assert_eq!(body["id"], id);
    assert_eq!(body["isRunning"], true);

    let response = client
        .get(format!("http://{api}/api/monitors/{id}"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["host"], "127.0.0.1");
    assert_eq!(body["interval"], 50);

    registry.shutdown().await;
    target_task.abort();
}

#[tokio::test]
async fn test_create_without_interval_uses_default() {
    let (api, registry, _dir) = spawn_test_api().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{api}/api/monitors"))
        .json(&json!({ "host": "example.com", "port": 443 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["interval"], 5000);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_create_duplicate_is_conflict() {
    let (api, registry, _dir) = spawn_test_api().await;
    let client = reqwest::Client::new();

    let request = json!({ "host": "a", "port": 80, "interval": 1000 });

    let first = client
        .post(format!("http://{api}/api/monitors"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client
        .post(format!("http://{api}/api/monitors"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body: Value = second.json().await.unwrap();
    assert!(body["error"].is_string());

    registry.shutdown().await;
}

#[tokio::test]
async fn test_create_invalid_arguments_rejected() {
    let (api, registry, _dir) = spawn_test_api().await;
    let client = reqwest::Client::new();

    for bad in [
        json!({ "host": "", "port": 80, "interval": 1000 }),
        json!({ "host": "a", "port": 0, "interval": 1000 }),
        json!({ "host": "a", "port": 80, "interval": 0 }),
    ] {
        let response = client
            .post(format!("http://{api}/api/monitors"))
            .json(&bad)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload: {bad}");
    }

    // nothing leaked into the registry
    let response = client
        .get(format!("http://{api}/api/monitors"))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 0);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_unknown_monitor_is_not_found() {
    let (api, registry, _dir) = spawn_test_api().await;
    let client = reqwest::Client::new();

    for request in [
        client.get(format!("http://{api}/api/monitors/ghost:1")),
        client.delete(format!("http://{api}/api/monitors/ghost:1")),
        client.get(format!("http://{api}/api/monitors/ghost:1/history")),
        client.post(format!("http://{api}/api/monitors/ghost:1/start")),
        client.post(format!("http://{api}/api/monitors/ghost:1/stop")),
    ] {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    registry.shutdown().await;
}

#[tokio::test]
async fn test_delete_monitor_persists() {
    let (api, registry, dir) = spawn_test_api().await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{api}/api/monitors"))
        .json(&json!({ "host": "a", "port": 80, "interval": 1000 }))
        .send()
        .await
        .unwrap();

    let response = client
        .delete(format!("http://{api}/api/monitors/a:80"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("http://{api}/api/monitors/a:80"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // the mutation reached the store
    let saved = tokio::fs::read_to_string(dir.path().join("monitors.json"))
        .await
        .unwrap();
    let saved: Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved.as_array().unwrap().len(), 0);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_history_endpoint_with_limit() {
    let (api, registry, _dir) = spawn_test_api().await;
    let (target, target_task) = spawn_target().await;
    let client = reqwest::Client::new();
    let id = format!("127.0.0.1:{}", target.port());

    client
        .post(format!("http://{api}/api/monitors"))
        .json(&json!({ "host": "127.0.0.1", "port": target.port(), "interval": 20 }))
        .send()
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    let response = client
        .get(format!(
            "http://{api}/api/monitors/{id}/history?range=1h&limit=3"
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let history: Vec<Value> = response.json().await.unwrap();

    assert!(!history.is_empty());
    assert!(history.len() <= 3);
    for outcome in &history {
        assert_eq!(outcome["success"], true);
    }

    registry.shutdown().await;
    target_task.abort();
}

#[tokio::test]
async fn test_start_stop_endpoints() {
    let (api, registry, _dir) = spawn_test_api().await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{api}/api/monitors"))
        .json(&json!({ "host": "a", "port": 80, "interval": 60000 }))
        .send()
        .await
        .unwrap();

    let stopped: Value = client
        .post(format!("http://{api}/api/monitors/a:80/stop"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stopped["isRunning"], false);

    let started: Value = client
        .post(format!("http://{api}/api/monitors/a:80/start"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(started["isRunning"], true);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_patch_interval() {
    let (api, registry, _dir) = spawn_test_api().await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{api}/api/monitors"))
        .json(&json!({ "host": "a", "port": 80, "interval": 1000 }))
        .send()
        .await
        .unwrap();

    let response = client
        .patch(format!("http://{api}/api/monitors/a:80"))
        .json(&json!({ "interval": 2500 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["interval"], 2500);

    let zero = client
        .patch(format!("http://{api}/api/monitors/a:80"))
        .json(&json!({ "interval": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_websocket_init_then_updates() {
    let (api, registry, _dir) = spawn_test_api().await;
    let (target, target_task) = spawn_target().await;
    let id = format!("127.0.0.1:{}", target.port());

    // one monitor exists before the observer connects
    registry.create("a", 80, 60_000).await.unwrap();

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{api}/ws"))
        .await
        .unwrap();

    // first frame is the full-state burst
    let init = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let init: Value = serde_json::from_str(init.to_text().unwrap()).unwrap();

    assert_eq!(init["type"], "init");
    assert_eq!(init["data"].as_array().unwrap().len(), 1);

    // a probing monitor created afterwards shows up as updates
    registry
        .create("127.0.0.1", target.port(), 25)
        .await
        .unwrap();

    let update = loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), socket.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let value: Value = serde_json::from_str(msg.to_text().unwrap()).unwrap();
        if value["type"] == "update" && value["data"]["id"] == id.as_str() {
            break value;
        }
    };

    assert!(update["data"]["stats"]["totalPings"].as_u64().unwrap() >= 1);

    registry.shutdown().await;
    target_task.abort();
}
