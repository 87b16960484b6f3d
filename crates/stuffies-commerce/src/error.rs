//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in e-commerce operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// No variant of the product matches the requested size.
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// Insufficient inventory.
    #[error("Insufficient inventory for {product_id}: requested {requested}, available {available}")]
    InsufficientInventory {
        product_id: String,
        requested: u64,
        available: u64,
    },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Remote collaborator (catalog or order API) failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

/// Why an order could not be placed.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("Tu carrito está vacío.")]
    EmptyCart,

    /// One or more customer fields failed validation.
    #[error("Revisa los campos marcados: {0}")]
    Invalid(crate::checkout::ValidationErrors),

    /// The order service rejected or never received the order. The cart is
    /// left as it was.
    #[error("No se pudo registrar la compra. Intenta nuevamente.")]
    Submission(#[source] CommerceError),
}
