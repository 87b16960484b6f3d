//! In-memory cart aggregation.

use crate::cart::{AddOptions, CartLineItem, LineIdentity, ProductSnapshot};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Derived cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of quantities over every line.
    pub cantidad: u64,
    /// Sum of `precio * cantidad` over every line. No tax, shipping or
    /// discounts.
    pub subtotal: Money,
}

/// A shopping cart: line items in insertion order, at most one per
/// [`LineIdentity`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from stored lines.
    ///
    /// Every line is [normalized](CartLineItem::normalized) first, then
    /// lines sharing an identity are folded into the first one, so the
    /// identity invariant holds for carts written by older clients and for
    /// hand-edited storage.
    pub fn from_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut cart = Self::new();
        for item in items.into_iter().map(CartLineItem::normalized) {
            let identity = item.identity();
            match cart.items.iter_mut().find(|i| i.is(&identity)) {
                Some(existing) => {
                    existing.cantidad = existing.cantidad.saturating_add(item.cantidad);
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Add a product.
    ///
    /// If a line with the same identity exists its quantity grows by
    /// `opts.cantidad`; otherwise a new line is appended. Returns the
    /// resulting line.
    pub fn add_item(&mut self, product: ProductSnapshot, opts: AddOptions) -> CartLineItem {
        let added = opts.cantidad.max(1);
        let identity = LineIdentity::new(product.id.clone(), opts.selection.clone());

        if let Some(existing) = self.items.iter_mut().find(|i| i.is(&identity)) {
            existing.cantidad = existing.cantidad.saturating_add(added);
            return existing.clone();
        }

        let item = CartLineItem::new(product, opts.selection, added);
        self.items.push(item.clone());
        item
    }

    /// Set a line's quantity to `max(1, cantidad)`.
    ///
    /// Returns false (and changes nothing) when no line matches.
    pub fn update_quantity(&mut self, identity: &LineIdentity, cantidad: i64) -> bool {
        let clamped = u32::try_from(cantidad.max(1)).unwrap_or(u32::MAX);
        match self.items.iter_mut().find(|i| i.is(identity)) {
            Some(item) => {
                item.cantidad = clamped;
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns false when no line matches.
    pub fn remove_item(&mut self, identity: &LineIdentity) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| !i.is(identity));
        self.items.len() < len_before
    }

    /// Clear all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Quantity currently held for an identity, 0 if absent.
    pub fn quantity_of(&self, identity: &LineIdentity) -> u32 {
        self.get_item(identity).map(|i| i.cantidad).unwrap_or(0)
    }

    pub fn get_item(&self, identity: &LineIdentity) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.is(identity))
    }

    /// Totals over every line.
    pub fn totals(&self) -> CartTotals {
        self.items.iter().fold(CartTotals::default(), |acc, item| CartTotals {
            cantidad: acc.cantidad.saturating_add(u64::from(item.cantidad)),
            subtotal: acc.subtotal + item.line_total(),
        })
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
