//! Message composition: event in, push message out.
//!
//! [`compose`] is a pure function. The same event always yields the same
//! [`ComposedMessage`], byte for byte, which lets a broadcast build its
//! message once and hand the same value to every recipient.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::event::{Announcement, NotificationEvent, RecipientKind, StatusChange};
use crate::notification_kinds::{TYPE_ANNOUNCEMENT, TYPE_DISPATCH, TYPE_REPORT_STATUS};

/// Title used for every announcement push.
pub const ANNOUNCEMENT_TITLE: &str = "New Announcement";

/// Title used for every responder dispatch push.
pub const DISPATCH_TITLE: &str = "New Dispatch Assignment";

/// Incident label used in status updates when the report has none.
const DEFAULT_STATUS_INCIDENT: &str = "Incident";

/// Incident label used in dispatch notices when the report has none.
const DEFAULT_DISPATCH_INCIDENT: &str = "case";

/// A rendered notification, ready to hand to a delivery provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedMessage {
    pub title: String,
    pub body: String,
    /// Key/value payload delivered alongside the visible notification.
    /// Ordered so that serialization is stable.
    pub structured_data: BTreeMap<String, String>,
}

/// Render the push message for an event.
pub fn compose(event: &NotificationEvent) -> ComposedMessage {
    match event {
        NotificationEvent::StatusChange(change) => match change.recipient_kind {
            RecipientKind::ResponderDispatch => compose_dispatch(change),
            RecipientKind::Reporter => compose_status_update(change),
        },
        NotificationEvent::Announcement(announcement) => compose_announcement(announcement),
    }
}

fn compose_status_update(change: &StatusChange) -> ComposedMessage {
    let incident = incident_or(change, DEFAULT_STATUS_INCIDENT);
    ComposedMessage {
        title: format!("Report Status Updated: {}", change.new_status),
        body: format!(
            "Your report ({incident}) at {} is now: {}",
            change.location, change.new_status
        ),
        structured_data: report_data(TYPE_REPORT_STATUS, change),
    }
}

fn compose_dispatch(change: &StatusChange) -> ComposedMessage {
    let incident = incident_or(change, DEFAULT_DISPATCH_INCIDENT);
    ComposedMessage {
        title: DISPATCH_TITLE.to_string(),
        body: format!(
            "You have been dispatched to a {incident} at {}",
            change.location
        ),
        structured_data: report_data(TYPE_DISPATCH, change),
    }
}

// The pushed body carries the announcement title only; `content` is for
// the in-app view.
fn compose_announcement(announcement: &Announcement) -> ComposedMessage {
    ComposedMessage {
        title: ANNOUNCEMENT_TITLE.to_string(),
        body: announcement.title.clone(),
        structured_data: BTreeMap::from([
            ("type".to_string(), TYPE_ANNOUNCEMENT.to_string()),
            (
                "announcementId".to_string(),
                announcement.announcement_id.to_string(),
            ),
        ]),
    }
}

fn incident_or<'a>(change: &'a StatusChange, default: &'a str) -> &'a str {
    change
        .incident_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
}

fn report_data(kind: &str, change: &StatusChange) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("type".to_string(), kind.to_string()),
        ("reportId".to_string(), change.report_id.clone()),
        ("status".to_string(), change.new_status.clone()),
    ])
}
