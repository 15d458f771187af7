use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Recipient unreachable: user {user_id} has no delivery endpoint")]
    RecipientUnreachable { user_id: DbId },
}
