//! Shared harness for API integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

use tigersafe_api::config::ServerConfig;
use tigersafe_api::router::build_app_router;
use tigersafe_api::state::AppState;
use tigersafe_core::composer::ComposedMessage;
use tigersafe_core::identity::{Endpoint, Identity};
use tigersafe_core::types::DbId;
use tigersafe_events::{
    DeliveryError, DeliveryProvider, DirectoryError, DirectoryReader, NotificationService,
};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Build the full application router around in-memory collaborators.
///
/// Uses the production [`build_app_router`], so every test runs through
/// the same middleware stack as `main.rs`.
pub fn build_test_app(directory: FakeDirectory, provider: Arc<FakeProvider>) -> Router {
    build_test_app_with_tracker(directory, provider).0
}

/// Like [`build_test_app`], also returning the tracker that background
/// broadcasts are spawned on.
pub fn build_test_app_with_tracker(
    directory: FakeDirectory,
    provider: Arc<FakeProvider>,
) -> (Router, TaskTracker) {
    let config = test_config();
    let notifier = Arc::new(NotificationService::new(Arc::new(directory), provider));
    let background = TaskTracker::new();

    let state = AppState {
        config: Arc::new(config.clone()),
        notifier,
        background: background.clone(),
    };

    (build_app_router(state, &config), background)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST an arbitrary body with a JSON content type.
pub async fn post_raw(app: Router, uri: &str, body: &'static str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeDirectory {
    identities: Vec<Identity>,
    offline: bool,
}

impl FakeDirectory {
    /// Two responders and one citizen, all with tokens.
    pub fn sample() -> Self {
        Self {
            identities: vec![
                Identity::new(1, ["ert"], Some(Endpoint::new("tokA"))),
                Identity::new(2, ["citizen"], Some(Endpoint::new("tokB"))),
                Identity::new(3, ["ert", "admin"], Some(Endpoint::new("tokC"))),
                Identity::new(4, ["citizen"], None),
            ],
            offline: false,
        }
    }

    pub fn offline() -> Self {
        Self {
            identities: Vec::new(),
            offline: true,
        }
    }

    fn check(&self) -> Result<(), DirectoryError> {
        if self.offline {
            return Err(DirectoryError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryReader for FakeDirectory {
    async fn get_identity(&self, id: DbId) -> Result<Option<Identity>, DirectoryError> {
        self.check()?;
        Ok(self.identities.iter().find(|i| i.id == id).cloned())
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, DirectoryError> {
        self.check()?;
        Ok(self.identities.clone())
    }

    async fn health_check(&self) -> Result<(), DirectoryError> {
        self.check()
    }
}

#[derive(Default)]
pub struct FakeProvider {
    sent: Mutex<Vec<(String, ComposedMessage)>>,
    rejecting: HashSet<String>,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting(tokens: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            rejecting: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        })
    }

    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.clone())
            .collect();
        tokens.sort();
        tokens
    }

    pub fn messages(&self) -> Vec<ComposedMessage> {
        self.sent.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliveryProvider for FakeProvider {
    async fn send(
        &self,
        endpoint: &Endpoint,
        message: &ComposedMessage,
    ) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((endpoint.as_str().to_string(), message.clone()));

        if self.rejecting.contains(endpoint.as_str()) {
            return Err(DeliveryError::Rejected {
                status: 404,
                detail: "UNREGISTERED".to_string(),
            });
        }
        Ok(())
    }
}
