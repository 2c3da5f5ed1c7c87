//! Shared test utilities for integration tests.
//!
//! Provides a `TestClient` that drives the JSON API against a fresh
//! in-memory database, with helpers for the common setup steps.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use fintrack::config::Config;
use fintrack::db::{create_in_memory_pool, migrations};
use fintrack::handlers;
use fintrack::state::AppState;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tower::ServiceExt;

/// Drives the application router with per-request user identity, the way
/// the fronting auth layer would.
pub struct TestClient {
    pub state: AppState,
}

impl TestClient {
    pub fn new() -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        {
            let conn = pool.get().expect("Failed to get connection");
            migrations::run_migrations(&conn, Path::new("migrations"))
                .expect("Failed to run migrations");
        }

        let config = Config {
            host: "127.0.0.1".into(),
            port: 7080,
            database_path: PathBuf::from(":memory:"),
            migrations_path: PathBuf::from("migrations"),
        };

        Self {
            state: AppState::new(pool, config),
        }
    }

    pub fn router(&self) -> Router {
        handlers::routes().with_state(self.state.clone())
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }

        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    pub async fn get(&self, user: &str, uri: &str) -> (StatusCode, String) {
        self.request("GET", uri, Some(user), None).await
    }

    /// GET without the identity header, for auth rejection tests.
    pub async fn get_anonymous(&self, uri: &str) -> (StatusCode, String) {
        self.request("GET", uri, None, None).await
    }

    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        user: &str,
        uri: &str,
    ) -> (StatusCode, Option<T>) {
        let (status, body) = self.get(user, uri).await;
        (status, serde_json::from_str(&body).ok())
    }

    pub async fn post_json(&self, user: &str, uri: &str, body: Value) -> (StatusCode, String) {
        self.request("POST", uri, Some(user), Some(body)).await
    }

    pub async fn put_json(&self, user: &str, uri: &str, body: Value) -> (StatusCode, String) {
        self.request("PUT", uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, user: &str, uri: &str) -> (StatusCode, String) {
        self.request("DELETE", uri, Some(user), None).await
    }

    // =========================================================================
    // Helper methods for creating entities through the API
    // =========================================================================

    /// Create a transaction and return its generated id.
    pub async fn create_transaction(
        &self,
        user: &str,
        description: &str,
        amount_cents: i64,
        kind: &str,
        category: &str,
    ) -> String {
        self.create_transaction_full(user, description, amount_cents, kind, category, None, None)
            .await
    }

    pub async fn create_transaction_full(
        &self,
        user: &str,
        description: &str,
        amount_cents: i64,
        kind: &str,
        category: &str,
        goal_id: Option<&str>,
        date: Option<&str>,
    ) -> String {
        let mut payload = json!({
            "description": description,
            "amountCents": amount_cents,
            "type": kind,
            "category": category,
        });
        if let Some(goal_id) = goal_id {
            payload["goalId"] = json!(goal_id);
        }
        if let Some(date) = date {
            payload["date"] = json!(date);
        }

        let (status, body) = self.post_json(user, "/api/transactions", payload).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);

        let parsed: Value = serde_json::from_str(&body).unwrap();
        parsed["id"].as_str().unwrap().to_string()
    }

    /// Create a budget and return its generated id.
    pub async fn create_budget(&self, user: &str, category: &str, amount_cents: i64) -> String {
        let (status, body) = self
            .post_json(
                user,
                "/api/budgets",
                json!({ "category": category, "amountCents": amount_cents }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);

        let parsed: Value = serde_json::from_str(&body).unwrap();
        parsed["id"].as_str().unwrap().to_string()
    }

    /// Create a goal and return its generated id.
    pub async fn create_goal(
        &self,
        user: &str,
        name: &str,
        target_amount_cents: i64,
        target_date: Option<&str>,
    ) -> String {
        let mut payload = json!({ "name": name, "targetAmountCents": target_amount_cents });
        if let Some(date) = target_date {
            payload["targetDate"] = json!(date);
        }

        let (status, body) = self.post_json(user, "/api/goals", payload).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);

        let parsed: Value = serde_json::from_str(&body).unwrap();
        parsed["id"].as_str().unwrap().to_string()
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
