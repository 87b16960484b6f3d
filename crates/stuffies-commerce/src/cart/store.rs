//! Persistent cart store.
//!
//! The whole cart lives under one key as a JSON array of line items. Every
//! mutation is read-modify-write of that value followed by a change
//! notification. Storage failures never reach the caller: reads degrade to
//! an empty cart and writes are dropped, both with a warning.

use std::sync::{Arc, Mutex, PoisonError};

use stuffies_cache::{cache_key, Cache};

use crate::cart::observer::Observers;
use crate::cart::{
    AddOptions, Cart, CartLineItem, CartObserver, CartTotals, LineIdentity, ProductSnapshot,
    Subscription,
};
use crate::catalog::{StockLevels, Variant};
use crate::error::CommerceError;

/// Key the cart is stored under unless configured otherwise.
pub fn default_cart_key() -> String {
    cache_key!("stuffies", "cart")
}

/// The shopper's pending line items, persisted to a key-value store.
///
/// Construct one per session and share it (it is `Send + Sync`). Views
/// subscribe to be told when to re-read the cart.
///
/// # Example
///
/// ```rust,ignore
/// let store = CartStore::new(Cache::open_dir(".stuffies/store")?);
/// store.add_to_cart(product.snapshot(), AddOptions::new().talla("M").cantidad(2));
/// let totals = store.get_cart_totals();
/// ```
#[derive(Debug)]
pub struct CartStore {
    cache: Cache,
    key: String,
    observers: Observers,
    write_lock: Mutex<()>,
}

impl CartStore {
    /// A store using [`default_cart_key`].
    pub fn new(cache: Cache) -> Self {
        Self::with_key(cache, default_cart_key())
    }

    /// A store using a custom key.
    pub fn with_key(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
            observers: Observers::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current line items in insertion order. Never fails.
    pub fn get_cart(&self) -> Vec<CartLineItem> {
        self.load().into_items()
    }

    /// Add a product, merging into an existing line with the same identity.
    ///
    /// Stock is not checked here; the backend enforces it at checkout. Use
    /// [`CartStore::add_within_stock`] for a checked add.
    pub fn add_to_cart(&self, product: ProductSnapshot, opts: AddOptions) -> CartLineItem {
        let item = self.mutate(|cart| cart.add_item(product, opts));
        tracing::debug!(
            product_id = %item.product_id,
            talla = ?item.talla,
            color = ?item.color,
            cantidad = item.cantidad,
            "cart line added"
        );
        item
    }

    /// Add a product only if the matching variant has stock for the
    /// quantity already in the cart plus the requested one.
    ///
    /// On failure the cart is left untouched and no notification is sent.
    pub fn add_within_stock(
        &self,
        product: ProductSnapshot,
        opts: AddOptions,
        variants: &[Variant],
    ) -> Result<CartLineItem, CommerceError> {
        let guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut cart = self.load();

        let identity = LineIdentity::new(product.id.clone(), opts.selection.clone());
        let wanted = u64::from(cart.quantity_of(&identity)) + u64::from(opts.cantidad.max(1));
        StockLevels::new(variants).ensure_available(
            &product.id,
            identity.selection.talla.as_deref(),
            wanted,
        )?;

        let item = cart.add_item(product, opts);
        self.save(&cart);
        drop(guard);

        self.observers.notify();
        Ok(item)
    }

    /// Set a line's quantity to `max(1, cantidad)`. No-op when absent.
    pub fn update_quantity(&self, identity: &LineIdentity, cantidad: i64) {
        let found = self.mutate(|cart| cart.update_quantity(identity, cantidad));
        if !found {
            tracing::debug!(product_id = %identity.product_id, "quantity update for missing line ignored");
        }
    }

    /// Remove a line. No-op when absent.
    pub fn remove_from_cart(&self, identity: &LineIdentity) {
        let removed = self.mutate(|cart| cart.remove_item(identity));
        if !removed {
            tracing::debug!(product_id = %identity.product_id, "remove for missing line ignored");
        }
    }

    /// Empty the cart and persist the empty state.
    pub fn clear_cart(&self) {
        self.mutate(Cart::clear);
    }

    /// Sum of quantities and of `precio * cantidad`.
    pub fn get_cart_totals(&self) -> CartTotals {
        self.load().totals()
    }

    /// Register an observer called after every mutating operation.
    pub fn subscribe(&self, observer: impl CartObserver + 'static) -> Subscription {
        self.observers.subscribe(Arc::new(observer))
    }

    /// Register a shared observer.
    pub fn subscribe_shared(&self, observer: Arc<dyn CartObserver>) -> Subscription {
        self.observers.subscribe(observer)
    }

    /// Remove an observer. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> R {
        let guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut cart = self.load();
        let result = f(&mut cart);
        self.save(&cart);
        drop(guard);

        self.observers.notify();
        result
    }

    fn load(&self) -> Cart {
        match self.cache.get::<Vec<CartLineItem>>(&self.key) {
            Ok(Some(items)) => Cart::from_items(items),
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "unreadable cart, starting empty");
                Cart::new()
            }
        }
    }

    fn save(&self, cart: &Cart) {
        if let Err(e) = self.cache.set(&self.key, cart.items()) {
            tracing::warn!(key = %self.key, error = %e, "failed to persist cart");
        }
    }
}
