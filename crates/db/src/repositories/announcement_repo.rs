//! Repository for the `announcements` table.

use sqlx::PgPool;
use tigersafe_core::types::DbId;

use crate::models::announcement::Announcement;

const COLUMNS: &str = "id, title, content, visibility_scope, created_at";

/// Read access to announcements.
pub struct AnnouncementRepo;

impl AnnouncementRepo {
    /// Find an announcement by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Announcement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM announcements WHERE id = $1");
        sqlx::query_as::<_, Announcement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
