//! Announcement entity model.

use sqlx::FromRow;
use tigersafe_core::event::Announcement as AnnouncementEvent;
use tigersafe_core::identity::VisibilityScope;
use tigersafe_core::types::{DbId, Timestamp};

/// Full announcement row from the `announcements` table.
#[derive(Debug, Clone, FromRow)]
pub struct Announcement {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub visibility_scope: Vec<String>,
    pub created_at: Timestamp,
}

impl Announcement {
    pub fn into_event(self) -> AnnouncementEvent {
        AnnouncementEvent {
            announcement_id: self.id,
            title: self.title,
            content: self.content,
            visibility_scope: VisibilityScope::new(self.visibility_scope),
        }
    }
}
