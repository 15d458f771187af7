//! Notification service: resolver → composer → dispatch engine.
//!
//! Both trigger shapes go through here. The directory and the push
//! provider are injected, so every collaborator can be substituted in
//! tests.

use std::sync::Arc;

use tigersafe_core::composer::compose;
use tigersafe_core::error::CoreError;
use tigersafe_core::event::{Announcement, NotificationEvent, StatusChange};

use crate::delivery::DeliveryProvider;
use crate::directory::DirectoryReader;
use crate::dispatch::{AggregateResult, DispatchEngine, DispatchOutcome};
use crate::error::NotifyResult;
use crate::resolver::{RecipientResolver, Target};

/// Entry point for every notification the platform sends.
///
/// Holds no per-invocation state; share it via `Arc<NotificationService>`.
pub struct NotificationService {
    directory: Arc<dyn DirectoryReader>,
    resolver: RecipientResolver,
    engine: DispatchEngine,
}

impl NotificationService {
    pub fn new(directory: Arc<dyn DirectoryReader>, provider: Arc<dyn DeliveryProvider>) -> Self {
        Self {
            resolver: RecipientResolver::new(Arc::clone(&directory)),
            engine: DispatchEngine::new(provider),
            directory,
        }
    }

    /// Notify the single identity named in a status change.
    ///
    /// Validation errors, an unreachable recipient, and a failed send all
    /// fail the call. An unreachable recipient never reaches the provider.
    pub async fn notify_status_change(&self, change: StatusChange) -> NotifyResult<DispatchOutcome> {
        change.validate()?;

        let user_id = change.target_identity;
        let recipient_kind = change.recipient_kind.as_str();
        let resolution = self.resolver.resolve(&Target::Direct(user_id)).await?;
        let endpoint = resolution
            .endpoints
            .into_iter()
            .next()
            .ok_or(CoreError::RecipientUnreachable { user_id })?;

        let event = NotificationEvent::from(change);
        let message = compose(&event);

        tracing::debug!(
            user_id,
            recipient_kind,
            title = %message.title,
            "Sending status-change notification"
        );
        self.engine.dispatch_one(&message, &endpoint).await
    }

    /// Broadcast an announcement to everyone its visibility scope admits.
    ///
    /// Only validation and directory failures are errors; per-recipient
    /// delivery failures are reported in the returned aggregate.
    pub async fn broadcast_announcement(
        &self,
        announcement: Announcement,
    ) -> NotifyResult<AggregateResult> {
        announcement.validate()?;

        let announcement_id = announcement.announcement_id;
        let target = Target::Scoped(announcement.visibility_scope.clone());
        let resolution = self.resolver.resolve(&target).await?;

        let message = compose(&NotificationEvent::from(announcement));

        tracing::debug!(
            announcement_id,
            recipients = resolution.endpoints.len(),
            "Broadcasting announcement"
        );
        Ok(self
            .engine
            .dispatch(&message, &resolution.endpoints, resolution.skipped)
            .await)
    }

    /// Fire-and-forget form of [`broadcast_announcement`](Self::broadcast_announcement)
    /// used by the data-creation triggers: the outcome is logged, not returned.
    pub async fn handle_announcement_created(&self, announcement: Announcement) {
        let announcement_id = announcement.announcement_id;
        match self.broadcast_announcement(announcement).await {
            Ok(result) if result.attempted() == 0 => {
                tracing::info!(
                    announcement_id,
                    skipped = result.skipped,
                    "Announcement has no reachable audience"
                );
            }
            Ok(result) => {
                tracing::info!(
                    announcement_id,
                    attempted = result.attempted(),
                    succeeded = result.succeeded(),
                    failed = result.failed(),
                    skipped = result.skipped,
                    "Announcement broadcast finished"
                );
            }
            Err(e) => {
                tracing::error!(announcement_id, error = %e, "Announcement broadcast failed");
            }
        }
    }

    /// `true` when the directory answers its health check.
    pub async fn directory_healthy(&self) -> bool {
        match self.directory.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Directory health check failed");
                false
            }
        }
    }
}
