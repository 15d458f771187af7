//! Fan-out dispatch with per-endpoint failure isolation.
//!
//! Every endpoint of a broadcast gets its own Tokio task. A failed or
//! panicking attempt is recorded against that endpoint only; its siblings
//! run to completion regardless. The aggregate is assembled once every
//! attempt has concluded, in the order the endpoints were given.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tigersafe_core::composer::ComposedMessage;
use tigersafe_core::identity::Endpoint;

use crate::delivery::DeliveryProvider;
use crate::error::{NotifyError, NotifyResult};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub endpoint: Endpoint,
    pub succeeded: bool,
    pub error_detail: Option<String>,
}

impl DispatchOutcome {
    pub fn delivered(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failed(endpoint: Endpoint, detail: impl Into<String>) -> Self {
        Self {
            endpoint,
            succeeded: false,
            error_detail: Some(detail.into()),
        }
    }
}

/// All outcomes of one broadcast, in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    pub outcomes: Vec<DispatchOutcome>,
    /// Recipients that matched but had no endpoint, so were never attempted.
    pub skipped: usize,
}

impl AggregateResult {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }
}

// ---------------------------------------------------------------------------
// DispatchEngine
// ---------------------------------------------------------------------------

/// Issues delivery attempts through a [`DeliveryProvider`].
#[derive(Clone)]
pub struct DispatchEngine {
    provider: Arc<dyn DeliveryProvider>,
}

impl DispatchEngine {
    pub fn new(provider: Arc<dyn DeliveryProvider>) -> Self {
        Self { provider }
    }

    /// Broadcast `message` to every endpoint.
    ///
    /// Never fails as a whole: each endpoint's failure lands in its own
    /// [`DispatchOutcome`]. No retries.
    pub async fn dispatch(
        &self,
        message: &ComposedMessage,
        endpoints: &[Endpoint],
        skipped: usize,
    ) -> AggregateResult {
        if endpoints.is_empty() {
            tracing::info!(skipped, "No reachable recipients, nothing to dispatch");
            return AggregateResult {
                outcomes: Vec::new(),
                skipped,
            };
        }

        let message = Arc::new(message.clone());
        let attempts = endpoints.iter().cloned().map(|endpoint| {
            let provider = Arc::clone(&self.provider);
            let message = Arc::clone(&message);
            tokio::spawn(async move { attempt(provider.as_ref(), &message, endpoint).await })
        });

        let outcomes = join_all(attempts)
            .await
            .into_iter()
            .zip(endpoints)
            .map(|(joined, endpoint)| {
                joined.unwrap_or_else(|e| {
                    tracing::error!(%endpoint, error = %e, "Delivery task did not complete");
                    DispatchOutcome::failed(
                        endpoint.clone(),
                        format!("delivery task aborted: {e}"),
                    )
                })
            })
            .collect();

        let result = AggregateResult { outcomes, skipped };
        tracing::info!(
            attempted = result.attempted(),
            succeeded = result.succeeded(),
            failed = result.failed(),
            skipped = result.skipped,
            "Broadcast dispatch complete"
        );
        result
    }

    /// Send to a single endpoint, propagating any failure to the caller.
    pub async fn dispatch_one(
        &self,
        message: &ComposedMessage,
        endpoint: &Endpoint,
    ) -> NotifyResult<DispatchOutcome> {
        self.provider
            .send(endpoint, message)
            .await
            .map_err(|source| NotifyError::Delivery {
                endpoint: endpoint.clone(),
                source,
            })?;

        tracing::info!(%endpoint, title = %message.title, "Notification delivered");
        Ok(DispatchOutcome::delivered(endpoint.clone()))
    }
}

async fn attempt(
    provider: &dyn DeliveryProvider,
    message: &ComposedMessage,
    endpoint: Endpoint,
) -> DispatchOutcome {
    match provider.send(&endpoint, message).await {
        Ok(()) => {
            tracing::info!(%endpoint, "Notification delivered");
            DispatchOutcome::delivered(endpoint)
        }
        Err(e) => {
            tracing::warn!(%endpoint, error = %e, "Notification delivery failed");
            DispatchOutcome::failed(endpoint, e.to_string())
        }
    }
}
