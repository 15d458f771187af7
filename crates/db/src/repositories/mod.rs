//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async read methods
//! that accept `&PgPool` as the first argument.

pub mod announcement_repo;
pub mod user_repo;

pub use announcement_repo::AnnouncementRepo;
pub use user_repo::UserRepo;
