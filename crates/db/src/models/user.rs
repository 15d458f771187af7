//! User entity model.

use sqlx::FromRow;
use tigersafe_core::identity::{Endpoint, Identity};
use tigersafe_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the raw push token -- never serialize this to API responses.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub display_name: String,
    pub roles: Vec<String>,
    pub fcm_token: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Project the row onto the directory view used for targeting.
    ///
    /// A blank token counts as no token.
    pub fn into_identity(self) -> Identity {
        let endpoint = self
            .fcm_token
            .filter(|t| !t.trim().is_empty())
            .map(Endpoint::new);
        Identity::new(self.id, self.roles, endpoint)
    }
}
