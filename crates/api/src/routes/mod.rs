pub mod health;
pub mod notification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /notifications/report-status                     synchronous status trigger (POST)
/// /triggers/announcement-created                   data-creation trigger (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/notifications", notification::notifications_router())
        .nest("/triggers", notification::triggers_router())
}
