//! Integration tests for the bridge HTTP surface.
//!
//! Runs the real axum server against a null presence client and exercises
//! the public contract end to end: update flow, counters, CORS preflight,
//! and bind failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use openrpc_bridge::client::{ClientError, PresenceClient};
use openrpc_bridge::config::BridgeConfig;
use openrpc_bridge::server::{BridgeState, start_server_with_state};
use openrpc_proto::activity::ActivityRecord;

/// Presence client that accepts everything and counts updates.
#[derive(Default)]
struct NullClient {
    updates: Arc<AtomicU64>,
}

#[async_trait]
impl PresenceClient for NullClient {
    async fn connect(&mut self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn update(&mut self, _record: &ActivityRecord) -> Result<(), ClientError> {
        self.updates.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        Ok(())
    }
}

/// Start a connected bridge on an OS-assigned loopback port.
async fn start_bridge() -> (std::net::SocketAddr, Arc<AtomicU64>) {
    let client = NullClient::default();
    let updates = Arc::clone(&client.updates);

    let state = Arc::new(BridgeState::new(BridgeConfig::default(), Box::new(client)));
    state.connect().await.expect("fake connect cannot fail");

    let (addr, _handle) = start_server_with_state("127.0.0.1:0", state)
        .await
        .expect("failed to start bridge server");
    (addr, updates)
}

#[tokio::test]
async fn post_then_health_shows_incremented_updates() {
    let (addr, updates) = start_bridge().await;
    let http = reqwest::Client::new();

    let before: serde_json::Value = http
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let before_updates = before["updates"].as_u64().unwrap();

    let resp = http
        .post(format!("http://{addr}/"))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"success": true}));

    let after: serde_json::Value = http
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after["updates"].as_u64().unwrap(), before_updates + 1);
    assert_eq!(updates.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn full_update_round_trip() {
    let (addr, updates) = start_bridge().await;

    let body = serde_json::json!({
        "details": "Natural Disaster Survival",
        "state": "Round 12",
        "large_image": "game_icon",
        "small_image": "avatar",
        "url": "https://www.roblox.com/games/189707",
        "profile_url": "https://www.roblox.com/users/156/profile",
    });
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/"))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(updates.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn options_preflight_carries_cors_headers() {
    let (addr, _updates) = start_bridge().await;

    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(
        resp.headers()
            .get("access-control-allow-methods")
            .and_then(|v| v.to_str().ok()),
        Some("GET, POST, OPTIONS")
    );
    assert_eq!(
        resp.headers()
            .get("access-control-allow-headers")
            .and_then(|v| v.to_str().ok()),
        Some("Content-Type")
    );
}

#[tokio::test]
async fn stats_and_health_agree_on_counters() {
    let (addr, _updates) = start_bridge().await;
    let http = reqwest::Client::new();

    for _ in 0..3 {
        let resp = http
            .post(format!("http://{addr}/"))
            .body("{}")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let health: serde_json::Value = http
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let stats: serde_json::Value = http
        .get(format!("http://{addr}/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(health["updates"], 3);
    assert_eq!(stats["update_count"], 3);
    assert_eq!(stats["connected"], true);
    assert_eq!(health["connected"], true);
}

#[tokio::test]
async fn occupied_port_fails_to_bind() {
    // Hold the port with a plain listener, then try to start the bridge
    // on the same address.
    let blocker = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = blocker.local_addr().unwrap();

    let client = NullClient::default();
    let state = Arc::new(BridgeState::new(BridgeConfig::default(), Box::new(client)));

    let result = start_server_with_state(&addr.to_string(), state).await;
    let err = result.err().expect("bind on an occupied port must fail");
    assert_eq!(err.kind(), std::io::ErrorKind::AddrInUse);
}
