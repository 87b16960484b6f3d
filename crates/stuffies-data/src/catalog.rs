//! Catalog over HTTP.

use async_trait::async_trait;
use serde_json::Value;
use stuffies_commerce::catalog::{
    normalize_product, normalize_product_list, normalize_variants, CatalogSource, Product, Variant,
};
use stuffies_commerce::{CommerceError, ProductId};

use crate::client::ApiClient;
use crate::error::FetchError;

/// [`CatalogSource`] backed by `/api/products`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: ApiClient,
}

impl HttpCatalog {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn not_found(id: &ProductId, e: FetchError) -> CommerceError {
    if e.is_not_found() {
        CommerceError::ProductNotFound(id.to_string())
    } else {
        e.into()
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CommerceError> {
        let raw: Value = self.client.get_json("/api/products").await?;
        Ok(normalize_product_list(&raw))
    }

    /// The product, then its variants. A failed variants call leaves the
    /// product with no variants instead of failing the lookup.
    async fn get_product(&self, id: &ProductId) -> Result<Product, CommerceError> {
        let raw: Value = self
            .client
            .get_json(&format!("/api/products/{id}"))
            .await
            .map_err(|e| not_found(id, e))?;
        let mut product =
            normalize_product(&raw).ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))?;

        product.variants = match self.get_variants(id).await {
            Ok(variants) => variants,
            Err(e) => {
                tracing::warn!(product_id = %id, error = %e, "variants unavailable");
                Vec::new()
            }
        };
        Ok(product)
    }

    async fn get_variants(&self, id: &ProductId) -> Result<Vec<Variant>, CommerceError> {
        let raw: Value = self
            .client
            .get_json(&format!("/api/products/{id}/variants"))
            .await
            .map_err(|e| not_found(id, e))?;
        Ok(normalize_variants(&raw))
    }
}
