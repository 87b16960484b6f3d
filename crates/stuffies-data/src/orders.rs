//! Orders over HTTP.

use async_trait::async_trait;
use serde_json::Value;
use stuffies_commerce::checkout::{
    normalize_order, normalize_order_list, OrderPayload, OrderReceipt, OrderSink, OrderSummary,
};
use stuffies_commerce::{CommerceError, OrderId};

use crate::client::ApiClient;
use crate::error::FetchError;

/// `/api/orders`: create at checkout, list and read for history and receipts.
#[derive(Debug, Clone)]
pub struct HttpOrders {
    client: ApiClient,
}

impl HttpOrders {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Every order the signed-in account may see.
    pub async fn list_orders(&self) -> Result<Vec<OrderSummary>, FetchError> {
        let raw: Value = self.client.get_json("/api/orders").await?;
        Ok(normalize_order_list(&raw))
    }

    /// One order, `None` when the backend does not know it.
    pub async fn get_order(&self, id: &OrderId) -> Result<Option<OrderSummary>, FetchError> {
        match self.client.get_json::<Value>(&format!("/api/orders/{id}")).await {
            Ok(raw) => Ok(normalize_order(&raw)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl OrderSink for HttpOrders {
    async fn create_order(&self, payload: &OrderPayload) -> Result<OrderReceipt, CommerceError> {
        let raw: Value = self.client.post_json("/api/orders", payload).await?;
        Ok(OrderReceipt::from_response(raw))
    }
}
