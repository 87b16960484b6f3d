//! The catalog collaborator.

use async_trait::async_trait;

use crate::catalog::{Product, Variant};
use crate::error::CommerceError;
use crate::ids::ProductId;

/// Read-only access to the product catalog.
///
/// Implementations return already-normalized products.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Every product in the catalog.
    async fn list_products(&self) -> Result<Vec<Product>, CommerceError>;

    /// One product, including its variants. Unknown ids fail with
    /// [`CommerceError::ProductNotFound`].
    async fn get_product(&self, id: &ProductId) -> Result<Product, CommerceError>;

    /// Stock per size for one product.
    async fn get_variants(&self, id: &ProductId) -> Result<Vec<Variant>, CommerceError>;
}
