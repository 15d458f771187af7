//! Push delivery providers.
//!
//! [`DeliveryProvider`] is the seam the [`DispatchEngine`](crate::DispatchEngine)
//! sends through. Implementations must tolerate many concurrent `send`
//! calls and keep no per-call shared state.

pub mod fcm;
pub mod log;

use async_trait::async_trait;
use tigersafe_core::composer::ComposedMessage;
use tigersafe_core::identity::Endpoint;

/// Error type for a single delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// No valid credential could be obtained for the provider.
    #[error("Push provider authentication failed: {0}")]
    Auth(String),

    /// The provider answered but refused the message.
    #[error("Push provider returned HTTP {status}: {detail}")]
    Rejected { status: u16, detail: String },
}

/// Sends one composed message to one endpoint.
#[async_trait]
pub trait DeliveryProvider: Send + Sync {
    async fn send(&self, endpoint: &Endpoint, message: &ComposedMessage)
        -> Result<(), DeliveryError>;
}
