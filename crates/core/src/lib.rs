//! TigerSafe domain core.
//!
//! Pure, I/O-free building blocks shared by the fan-out engine and the HTTP
//! boundary: identities and visibility scopes, notification events, the
//! message composer, and the domain error type.

pub mod composer;
pub mod error;
pub mod event;
pub mod identity;
pub mod notification_kinds;
pub mod types;
