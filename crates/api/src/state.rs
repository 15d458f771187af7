use std::sync::Arc;

use tigersafe_events::NotificationService;
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Fan-out engine used by every notification trigger.
    pub notifier: Arc<NotificationService>,
    /// Broadcasts started by HTTP triggers; drained on shutdown.
    pub background: TaskTracker,
}
