//! Cart, catalog and checkout domain for the Stuffies storefront.
//!
//! - **Catalog**: loose product JSON normalized into [`catalog::Product`],
//!   per-size stock in [`catalog::StockLevels`]
//! - **Cart**: line items merged on product, size and color; with the
//!   `storage` feature, a persistent [`cart::CartStore`] with change
//!   notification
//! - **Checkout**: customer form validation, order payloads, order placement
//!
//! Prices are whole Chilean pesos ([`Money`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use stuffies_commerce::prelude::*;
//! use stuffies_cache::Cache;
//!
//! let store = CartStore::new(Cache::open_dir(".stuffies/store")?);
//! store.subscribe(|| println!("cart changed"));
//!
//! let product = normalize_product(&raw).expect("product without id");
//! store.add_to_cart(product.snapshot(), AddOptions::new().talla("M").cantidad(2));
//!
//! let totals = store.get_cart_totals();
//! println!("{} items, {}", totals.cantidad, totals.subtotal);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use error::{CheckoutError, CommerceError};
pub use ids::*;
pub use money::Money;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CheckoutError, CommerceError};
    pub use crate::ids::*;
    pub use crate::money::Money;

    // Catalog
    pub use crate::catalog::{
        categories, normalize_product, normalize_product_list, normalize_variants, CatalogSource,
        Product, StockLevels, Variant,
    };

    // Cart
    pub use crate::cart::{
        AddOptions, Cart, CartLineItem, CartObserver, CartTotals, LineIdentity, ProductSnapshot,
        Subscription, VariantSelection,
    };
    #[cfg(feature = "storage")]
    pub use crate::cart::{default_cart_key, CartStore};

    // Checkout
    pub use crate::checkout::{
        AccountContact, CustomerField, CustomerForm, OrderPayload, OrderReceipt, OrderSink,
        OrderStatus, OrderSummary, ValidationErrors,
    };
    #[cfg(feature = "storage")]
    pub use crate::checkout::{account_contact, place_order};
}
