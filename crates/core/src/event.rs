//! Notification events: the sole input to resolution and composition.
//!
//! Events are built once at the boundary, validated, and then only ever
//! borrowed. Nothing downstream mutates them.

use crate::error::CoreError;
use crate::identity::VisibilityScope;
use crate::notification_kinds::{RECIPIENT_KIND_REPORTER, RECIPIENT_KIND_RESPONDER_DISPATCH};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// RecipientKind
// ---------------------------------------------------------------------------

/// Who a status change is addressed to, which selects its template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecipientKind {
    /// The citizen who filed the report.
    #[default]
    Reporter,
    /// A responder being dispatched to the report.
    ResponderDispatch,
}

impl RecipientKind {
    /// Map a wire label to a kind. Only `"responder-dispatch"` is special;
    /// anything else, including no label, is a reporter update.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some(RECIPIENT_KIND_RESPONDER_DISPATCH) => Self::ResponderDispatch,
            _ => Self::Reporter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reporter => RECIPIENT_KIND_REPORTER,
            Self::ResponderDispatch => RECIPIENT_KIND_RESPONDER_DISPATCH,
        }
    }
}

// ---------------------------------------------------------------------------
// StatusChange
// ---------------------------------------------------------------------------

/// A report changed status, or a responder was dispatched to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// The single identity to notify.
    pub target_identity: DbId,
    pub report_id: String,
    pub new_status: String,
    pub location: String,
    /// Free-form incident category; templates fall back to a default.
    pub incident_type: Option<String>,
    pub recipient_kind: RecipientKind,
}

impl StatusChange {
    /// Reject events whose template fields would render blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_blank("reportId", &self.report_id)?;
        require_non_blank("newStatus", &self.new_status)?;
        require_non_blank("location", &self.location)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Announcement
// ---------------------------------------------------------------------------

/// A broadcast announcement, visible to every identity whose roles
/// intersect `visibility_scope`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub announcement_id: DbId,
    pub title: String,
    /// Shown in-app only; never part of the pushed body.
    pub content: String,
    pub visibility_scope: VisibilityScope,
}

impl Announcement {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_blank("title", &self.title)
    }
}

// ---------------------------------------------------------------------------
// NotificationEvent
// ---------------------------------------------------------------------------

/// Everything that can trigger a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    StatusChange(StatusChange),
    Announcement(Announcement),
}

impl NotificationEvent {
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::StatusChange(change) => change.validate(),
            Self::Announcement(announcement) => announcement.validate(),
        }
    }
}

impl From<StatusChange> for NotificationEvent {
    fn from(change: StatusChange) -> Self {
        Self::StatusChange(change)
    }
}

impl From<Announcement> for NotificationEvent {
    fn from(announcement: Announcement) -> Self {
        Self::Announcement(announcement)
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
