//! Error type for the fan-out engine.

use tigersafe_core::error::CoreError;
use tigersafe_core::identity::Endpoint;

use crate::delivery::DeliveryError;
use crate::directory::DirectoryError;

/// Invocation-level failure.
///
/// Only single-target sends surface [`NotifyError::Delivery`]; broadcast
/// delivery failures are recorded per endpoint in the
/// [`AggregateResult`](crate::AggregateResult) instead.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Validation or unreachable-recipient failure from the domain layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The directory could not be read.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The push provider refused or failed a single-target send.
    #[error("Delivery to {endpoint} failed: {source}")]
    Delivery {
        endpoint: Endpoint,
        #[source]
        source: DeliveryError,
    },
}

/// Convenience alias for fan-out results.
pub type NotifyResult<T> = Result<T, NotifyError>;
