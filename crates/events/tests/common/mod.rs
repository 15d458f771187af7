//! In-memory collaborators for fan-out tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tigersafe_core::composer::ComposedMessage;
use tigersafe_core::identity::{Endpoint, Identity};
use tigersafe_core::types::DbId;
use tigersafe_events::{DeliveryError, DeliveryProvider, DirectoryError, DirectoryReader};

// ---------------------------------------------------------------------------
// StaticDirectory
// ---------------------------------------------------------------------------

/// Directory over a fixed list of identities, iterated in insertion order.
#[derive(Default)]
pub struct StaticDirectory {
    identities: Vec<Identity>,
    unavailable: bool,
}

impl StaticDirectory {
    pub fn new(identities: Vec<Identity>) -> Self {
        Self {
            identities,
            unavailable: false,
        }
    }

    /// A directory whose every read fails.
    pub fn unavailable() -> Self {
        Self {
            identities: Vec::new(),
            unavailable: true,
        }
    }

    fn check(&self) -> Result<(), DirectoryError> {
        if self.unavailable {
            return Err(DirectoryError::Unavailable("directory offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryReader for StaticDirectory {
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

// ---------------------------------------------------------------------------
// RecordingProvider
// ---------------------------------------------------------------------------

/// Provider that records every attempt and fails for chosen endpoints.
#[derive(Default)]
pub struct RecordingProvider {
    sent: Mutex<Vec<(Endpoint, ComposedMessage)>>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
}

impl RecordingProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail (with HTTP 404) every send to the given tokens.
    pub fn failing_for(tokens: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        })
    }

    /// Panic inside every send to the given tokens.
    pub fn panicking_for(tokens: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            panicking: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        })
    }

    /// Tokens attempted so far, in completion order.
    pub fn attempted_tokens(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(e, _)| e.as_str().to_string())
            .collect()
    }

    pub fn messages(&self) -> Vec<ComposedMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn attempt_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliveryProvider for RecordingProvider {
    async fn send(
        &self,
        endpoint: &Endpoint,
        message: &ComposedMessage,
    ) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((endpoint.clone(), message.clone()));

        if self.panicking.contains(endpoint.as_str()) {
            panic!("provider blew up for {}", endpoint.as_str());
        }
        if self.failing.contains(endpoint.as_str()) {
            return Err(DeliveryError::Rejected {
                status: 404,
                detail: "UNREGISTERED".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn identity(id: DbId, roles: &[&str], token: Option<&str>) -> Identity {
    Identity::new(id, roles.iter().copied(), token.map(Endpoint::new))
}

/// The three-identity directory used across the fan-out tests:
/// two ERT members and one citizen, all reachable.
pub fn sample_directory() -> StaticDirectory {
    StaticDirectory::new(vec![
        identity(1, &["ert"], Some("tokA")),
        identity(2, &["citizen"], Some("tokB")),
        identity(3, &["ert", "admin"], Some("tokC")),
    ])
}
