//! Handlers for the notification triggers.
//!
//! - `report_status` is the synchronous trigger: the caller waits for the
//!   single send and sees its failure.
//! - `announcement_created` is the webhook form of the data-creation
//!   trigger: it acknowledges immediately and broadcasts in the background.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tigersafe_core::event::{Announcement, RecipientKind, StatusChange};
use tigersafe_core::identity::VisibilityScope;
use tigersafe_core::types::DbId;
use validator::Validate;

use crate::error::AppResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /notifications/report-status`.
///
/// Field names follow the mobile client's camelCase payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatusRequest {
    #[validate(required(message = "userId is required"))]
    pub user_id: Option<DbId>,
    #[validate(
        required(message = "reportId is required"),
        length(min = 1, message = "reportId must not be empty")
    )]
    pub report_id: Option<String>,
    #[validate(
        required(message = "newStatus is required"),
        length(min = 1, message = "newStatus must not be empty")
    )]
    pub new_status: Option<String>,
    #[validate(
        required(message = "location is required"),
        length(min = 1, message = "location must not be empty")
    )]
    pub location: Option<String>,
    pub incident_type: Option<String>,
    /// `"responder-dispatch"` selects the dispatch notice; anything else
    /// is a status update for the reporter.
    pub recipient_kind: Option<String>,
}

impl ReportStatusRequest {
    fn into_status_change(self) -> AppResult<StatusChange> {
        self.validate()?;
        Ok(StatusChange {
            target_identity: self.user_id.unwrap_or_default(),
            report_id: self.report_id.unwrap_or_default(),
            new_status: self.new_status.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            recipient_kind: RecipientKind::from_label(self.recipient_kind.as_deref()),
            incident_type: self.incident_type,
        })
    }
}

/// Body for `POST /triggers/announcement-created`: the persisted record.
#[derive(Debug, Deserialize, Validate)]
pub struct AnnouncementCreatedRequest {
    #[validate(required(message = "id is required"))]
    pub id: Option<DbId>,
    #[validate(
        required(message = "title is required"),
        length(min = 1, message = "title must not be empty")
    )]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub visibility_scope: Vec<String>,
}

impl AnnouncementCreatedRequest {
    fn into_announcement(self) -> AppResult<Announcement> {
        self.validate()?;
        let announcement = Announcement {
            announcement_id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            content: self.content,
            visibility_scope: VisibilityScope::new(self.visibility_scope),
        };
        announcement.validate()?;
        Ok(announcement)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/report-status
///
/// Notify one user that their report changed status, or that they were
/// dispatched to one. Returns `{ "success": true }` once the push provider
/// accepted the message.
pub async fn report_status(
    State(state): State<AppState>,
    payload: Result<Json<ReportStatusRequest>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Json(input) = payload?;
    let change = input.into_status_change()?;
    let report_id = change.report_id.clone();
    let user_id = change.target_identity;

    state.notifier.notify_status_change(change).await?;

    tracing::info!(user_id, report_id = %report_id, "Report status notification sent");
    Ok(Json(json!({ "success": true })))
}

/// POST /api/v1/triggers/announcement-created
///
/// Accept a newly persisted announcement and broadcast it in the
/// background. Responds 202 with no body; delivery outcomes are only
/// logged.
pub async fn announcement_created(
    State(state): State<AppState>,
    payload: Result<Json<AnnouncementCreatedRequest>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(input) = payload?;
    let announcement = input.into_announcement()?;
    tracing::info!(
        announcement_id = announcement.announcement_id,
        "Announcement creation trigger received"
    );

    let notifier = state.notifier.clone();
    state.background.spawn(async move {
        notifier.handle_announcement_created(announcement).await;
    });

    Ok(StatusCode::ACCEPTED)
}
