//! Integration tests for the settings API: defaults and merge-upsert.

mod common;

use axum::http::StatusCode;
use common::TestClient;
use serde_json::{json, Value};

#[tokio::test]
async fn requires_authentication() {
    let client = TestClient::new();

    let (status, _) = client.get_anonymous("/api/settings").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unsaved_settings_come_back_as_defaults() {
    let client = TestClient::new();

    let (status, settings) = client.get_json::<Value>("u1", "/api/settings").await;
    assert_eq!(status, StatusCode::OK);

    let settings = settings.unwrap();
    assert_eq!(settings["theme"], "dark");
    assert_eq!(settings["currency"], "INR");
    assert_eq!(settings["language"], "en");
    assert_eq!(settings["notifications"], true);
    assert_eq!(settings["monthlyReport"], true);
}

/// A partial update touches only the named fields; everything else keeps
/// its current value.
#[tokio::test]
async fn partial_update_merges_into_defaults() {
    let client = TestClient::new();

    let (status, body) = client
        .put_json("u1", "/api/settings", json!({ "theme": "light" }))
        .await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);

    let saved: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(saved["theme"], "light");
    assert_eq!(saved["currency"], "INR");

    // a second patch must not undo the first
    client
        .put_json("u1", "/api/settings", json!({ "currency": "USD", "notifications": false }))
        .await;

    let (_, settings) = client.get_json::<Value>("u1", "/api/settings").await;
    let settings = settings.unwrap();
    assert_eq!(settings["theme"], "light");
    assert_eq!(settings["currency"], "USD");
    assert_eq!(settings["notifications"], false);
    assert_eq!(settings["monthlyReport"], true);
}

#[tokio::test]
async fn settings_are_per_user() {
    let client = TestClient::new();
    client
        .put_json("alice", "/api/settings", json!({ "theme": "light" }))
        .await;

    let (_, settings) = client.get_json::<Value>("bob", "/api/settings").await;
    assert_eq!(settings.unwrap()["theme"], "dark");
}
