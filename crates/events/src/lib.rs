//! TigerSafe notification fan-out engine.
//!
//! Turns a triggering event into push deliveries:
//!
//! - [`RecipientResolver`] -- maps a [`Target`] to delivery endpoints by
//!   reading the [`DirectoryReader`].
//! - [`tigersafe_core::composer`] -- renders the message (pure).
//! - [`DispatchEngine`] -- one attempt per endpoint, failures isolated.
//! - [`NotificationService`] -- wires the three together for both trigger
//!   shapes.
//! - [`AnnouncementListener`] -- data-creation trigger fed by Postgres
//!   `LISTEN`.
//! - [`delivery`] -- push provider implementations (FCM, dry-run log).

pub mod delivery;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod listener;
pub mod resolver;
pub mod service;

pub use delivery::fcm::{AccessTokenSource, FcmConfig, FcmDelivery, GcpTokenSource};
pub use delivery::log::LogDelivery;
pub use delivery::{DeliveryError, DeliveryProvider};
pub use directory::{DirectoryError, DirectoryReader, PgDirectory};
pub use dispatch::{AggregateResult, DispatchEngine, DispatchOutcome};
pub use error::{NotifyError, NotifyResult};
pub use listener::AnnouncementListener;
pub use resolver::{RecipientResolver, Resolution, Target};
pub use service::NotificationService;
