//! Data-creation trigger for announcements.
//!
//! [`AnnouncementListener`] subscribes to the Postgres channel the
//! `announcements` insert trigger notifies on. Each notification carries the
//! new row id; the listener loads the row and broadcasts it on its own task,
//! so one slow broadcast never holds up the next announcement. Outcomes go
//! to the log only.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgListener;
use tigersafe_core::types::DbId;
use tigersafe_db::repositories::AnnouncementRepo;
use tigersafe_db::{DbPool, ANNOUNCEMENT_CREATED_CHANNEL};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::service::NotificationService;

/// Pause after a failed receive before polling the listener again.
const RECEIVE_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Background service turning announcement inserts into broadcasts.
pub struct AnnouncementListener {
    pool: DbPool,
    service: Arc<NotificationService>,
    listener: PgListener,
}

impl AnnouncementListener {
    /// Open a dedicated connection and `LISTEN` on the announcement channel.
    ///
    /// Notifications sent after this returns are buffered until [`run`](Self::run)
    /// picks them up.
    pub async fn connect(
        pool: DbPool,
        service: Arc<NotificationService>,
    ) -> Result<Self, sqlx::Error> {
        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(ANNOUNCEMENT_CREATED_CHANNEL).await?;
        tracing::info!(channel = ANNOUNCEMENT_CREATED_CHANNEL, "Announcement listener subscribed");

        Ok(Self {
            pool,
            service,
            listener,
        })
    }

    /// Run the listen loop until `cancel` fires.
    ///
    /// Broadcasts already in flight are awaited before returning.
    pub async fn run(mut self, cancel: CancellationToken) {
        let tracker = TaskTracker::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Announcement listener cancelled");
                    break;
                }
                received = self.listener.recv() => match received {
                    Ok(notification) => {
                        let Some(announcement_id) = parse_announcement_id(notification.payload()) else {
                            tracing::warn!(
                                payload = notification.payload(),
                                "Ignoring announcement notification with invalid id"
                            );
                            continue;
                        };
                        let pool = self.pool.clone();
                        let service = Arc::clone(&self.service);
                        tracker.spawn(async move {
                            broadcast_by_id(&pool, &service, announcement_id).await;
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Announcement listener receive failed");
                        if pause_unless_cancelled(&cancel, RECEIVE_RETRY_DELAY).await {
                            break;
                        }
                    }
                }
            }
        }

        tracker.close();
        tracker.wait().await;
        tracing::info!("Announcement listener stopped");
    }
}

/// Sleep for `delay`, returning early with `true` if `cancel` fires first.
async fn pause_unless_cancelled(cancel: &CancellationToken, delay: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(delay) => false,
    }
}

/// Load one announcement and hand it to the service.
async fn broadcast_by_id(pool: &DbPool, service: &NotificationService, announcement_id: DbId) {
    match AnnouncementRepo::find_by_id(pool, announcement_id).await {
        Ok(Some(row)) => service.handle_announcement_created(row.into_event()).await,
        Ok(None) => {
            tracing::warn!(announcement_id, "Announcement vanished before broadcast");
        }
        Err(e) => {
            tracing::error!(announcement_id, error = %e, "Failed to load announcement");
        }
    }
}

fn parse_announcement_id(payload: &str) -> Option<DbId> {
    payload.trim().parse().ok()
}
