//! Row models for the tables the notification engine reads.

pub mod announcement;
pub mod user;
