//! Dry-run provider that only logs.
//!
//! Used when no push credentials are configured so local environments can
//! exercise every trigger without reaching a real provider.

use async_trait::async_trait;
use tigersafe_core::composer::ComposedMessage;
use tigersafe_core::identity::Endpoint;

use super::{DeliveryError, DeliveryProvider};

/// Logs every message at `info` and reports success.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDelivery;

#[async_trait]
impl DeliveryProvider for LogDelivery {
    async fn send(
        &self,
        endpoint: &Endpoint,
        message: &ComposedMessage,
    ) -> Result<(), DeliveryError> {
        tracing::info!(
            %endpoint,
            title = %message.title,
            body = %message.body,
            data = ?message.structured_data,
            "Dry-run push delivery"
        );
        Ok(())
    }
}
