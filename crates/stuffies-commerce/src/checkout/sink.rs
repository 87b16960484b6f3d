//! The order collaborator.

use async_trait::async_trait;

use crate::checkout::{OrderPayload, OrderReceipt};
use crate::error::CommerceError;

/// Something that turns an order payload into a persisted order.
///
/// Submission is not idempotent; callers must not retry on their own.
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn create_order(&self, payload: &OrderPayload) -> Result<OrderReceipt, CommerceError>;
}
