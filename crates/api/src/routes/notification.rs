//! Route definitions for the notification triggers.

use axum::routing::post;
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// POST   /report-status             -> report_status
/// ```
pub fn notifications_router() -> Router<AppState> {
    Router::new().route("/report-status", post(notification::report_status))
}

/// Routes mounted at `/triggers`.
///
/// ```text
/// POST   /announcement-created      -> announcement_created
/// ```
pub fn triggers_router() -> Router<AppState> {
    Router::new().route(
        "/announcement-created",
        post(notification::announcement_created),
    )
}
