//! Audience resolution: who gets a notification, and at which endpoint.

use std::sync::Arc;

use tigersafe_core::error::CoreError;
use tigersafe_core::identity::{Endpoint, VisibilityScope};
use tigersafe_core::types::DbId;

use crate::directory::DirectoryReader;
use crate::error::NotifyResult;

/// A targeting rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Exactly one identity; an unreachable identity is an error.
    Direct(DbId),
    /// Every identity whose roles intersect the scope; unreachable
    /// identities are skipped silently.
    Scoped(VisibilityScope),
}

/// Endpoints to notify, in directory order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub endpoints: Vec<Endpoint>,
    /// Identities that matched the target but had no endpoint.
    pub skipped: usize,
}

/// Resolves [`Target`]s against a [`DirectoryReader`].
///
/// Each call performs a single directory read; nothing is cached between
/// calls.
#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn DirectoryReader>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn DirectoryReader>) -> Self {
        Self { directory }
    }

    pub async fn resolve(&self, target: &Target) -> NotifyResult<Resolution> {
        match target {
            Target::Direct(user_id) => self.resolve_direct(*user_id).await,
            Target::Scoped(scope) => self.resolve_scoped(scope).await,
        }
    }

    async fn resolve_direct(&self, user_id: DbId) -> NotifyResult<Resolution> {
        let endpoint = self
            .directory
            .get_identity(user_id)
            .await?
            .and_then(|identity| identity.delivery_endpoint)
            .ok_or(CoreError::RecipientUnreachable { user_id })?;

        Ok(Resolution {
            endpoints: vec![endpoint],
            skipped: 0,
        })
    }

    async fn resolve_scoped(&self, scope: &VisibilityScope) -> NotifyResult<Resolution> {
        if scope.is_empty() {
            tracing::debug!("Empty visibility scope, no directory read needed");
            return Ok(Resolution::default());
        }

        let identities = self.directory.list_identities().await?;

        let mut resolution = Resolution::default();
        for identity in identities.into_iter().filter(|i| scope.admits(i)) {
            match identity.delivery_endpoint {
                Some(endpoint) => resolution.endpoints.push(endpoint),
                None => {
                    tracing::debug!(user_id = identity.id, "Recipient has no endpoint, skipping");
                    resolution.skipped += 1;
                }
            }
        }

        tracing::debug!(
            recipients = resolution.endpoints.len(),
            skipped = resolution.skipped,
            "Scoped audience resolved"
        );
        Ok(resolution)
    }
}
