//! Catalog and order collaborators picked by `[catalog] source` and
//! `[checkout] sink`.

use async_trait::async_trait;
use stuffies_commerce::catalog::{CatalogSource, Product, Variant};
use stuffies_commerce::checkout::{OrderPayload, OrderReceipt, OrderSink, OrderSummary};
use stuffies_commerce::{CommerceError, OrderId, ProductId};
use stuffies_data::{HttpCatalog, HttpOrders};

use crate::local::{FileCatalog, Outbox};

/// Where products are read from.
#[derive(Debug, Clone)]
pub enum Catalog {
    File(FileCatalog),
    Api(HttpCatalog, String),
}

impl Catalog {
    /// Human-readable location, for messages.
    pub fn location(&self) -> String {
        match self {
            Catalog::File(catalog) => catalog.path().display().to_string(),
            Catalog::Api(_, base_url) => base_url.clone(),
        }
    }
}

#[async_trait]
impl CatalogSource for Catalog {
    async fn list_products(&self) -> Result<Vec<Product>, CommerceError> {
        match self {
            Catalog::File(catalog) => catalog.list_products().await,
            Catalog::Api(catalog, _) => catalog.list_products().await,
        }
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, CommerceError> {
        match self {
            Catalog::File(catalog) => catalog.get_product(id).await,
            Catalog::Api(catalog, _) => catalog.get_product(id).await,
        }
    }

    async fn get_variants(&self, id: &ProductId) -> Result<Vec<Variant>, CommerceError> {
        match self {
            Catalog::File(catalog) => catalog.get_variants(id).await,
            Catalog::Api(catalog, _) => catalog.get_variants(id).await,
        }
    }
}

/// Where orders are placed and read back from.
#[derive(Debug, Clone)]
pub enum Orders {
    Outbox(Outbox),
    Api(HttpOrders, String),
}

impl Orders {
    pub fn location(&self) -> String {
        match self {
            Orders::Outbox(outbox) => outbox.dir().display().to_string(),
            Orders::Api(_, base_url) => base_url.clone(),
        }
    }

    /// Order history, newest first for the outbox, backend order otherwise.
    pub async fn list(&self) -> Result<Vec<OrderSummary>, CommerceError> {
        match self {
            Orders::Outbox(outbox) => outbox.list(),
            Orders::Api(orders, _) => Ok(orders.list_orders().await?),
        }
    }

    pub async fn get(&self, id: &OrderId) -> Result<Option<OrderSummary>, CommerceError> {
        match self {
            Orders::Outbox(outbox) => Ok(outbox.get(id)),
            Orders::Api(orders, _) => Ok(orders.get_order(id).await?),
        }
    }
}

#[async_trait]
impl OrderSink for Orders {
    async fn create_order(&self, payload: &OrderPayload) -> Result<OrderReceipt, CommerceError> {
        match self {
            Orders::Outbox(outbox) => outbox.create_order(payload).await,
            Orders::Api(orders, _) => orders.create_order(payload).await,
        }
    }
}
