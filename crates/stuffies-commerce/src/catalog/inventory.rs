//! Stock tracking per product variant.

use std::collections::BTreeMap;

use crate::error::CommerceError;
use crate::ids::{ProductId, VariantId};
use serde::{Deserialize, Serialize};

/// Stock for one size of a product, as published by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Variant {
    /// Backend id, absent for variants that were never saved.
    #[serde(default)]
    pub id: Option<VariantId>,
    /// Size label. `None` for a product sold without sizes.
    #[serde(default)]
    pub talla: Option<String>,
    /// Units on hand.
    #[serde(default)]
    pub stock: u64,
}

impl Variant {
    pub fn new(talla: Option<&str>, stock: u64) -> Self {
        Self {
            id: None,
            talla: talla.map(str::trim).filter(|t| !t.is_empty()).map(String::from),
            stock,
        }
    }

    fn matches(&self, talla: Option<&str>) -> bool {
        self.talla.as_deref() == talla
    }
}

/// Read-only stock view over a product's variants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockLevels<'a> {
    variants: &'a [Variant],
}

impl<'a> StockLevels<'a> {
    pub fn new(variants: &'a [Variant]) -> Self {
        Self { variants }
    }

    /// Total units across every variant.
    pub fn total(&self) -> u64 {
        self.variants
            .iter()
            .fold(0u64, |acc, v| acc.saturating_add(v.stock))
    }

    /// Units per size label, summing variants that share a size. The key is
    /// `None` for variants without a size.
    pub fn by_size(&self) -> BTreeMap<Option<String>, u64> {
        let mut map = BTreeMap::new();
        for v in self.variants {
            let entry = map.entry(v.talla.clone()).or_insert(0u64);
            *entry = entry.saturating_add(v.stock);
        }
        map
    }

    /// Size labels in catalog order, without duplicates.
    pub fn sizes(&self) -> Vec<&'a str> {
        let mut sizes: Vec<&str> = Vec::new();
        for talla in self.variants.iter().filter_map(|v| v.talla.as_deref()) {
            if !sizes.contains(&talla) {
                sizes.push(talla);
            }
        }
        sizes
    }

    /// Units available for a size selection.
    ///
    /// With no size selected every variant counts. A size that no variant
    /// carries yields `None`.
    pub fn available_for(&self, talla: Option<&str>) -> Option<u64> {
        match talla {
            None => Some(self.total()),
            Some(_) => {
                let mut matched = false;
                let mut sum = 0u64;
                for v in self.variants.iter().filter(|v| v.matches(talla)) {
                    matched = true;
                    sum = sum.saturating_add(v.stock);
                }
                matched.then_some(sum)
            }
        }
    }

    /// Check that `quantity` units of a size can be supplied.
    pub fn ensure_available(
        &self,
        product_id: &ProductId,
        talla: Option<&str>,
        quantity: u64,
    ) -> Result<(), CommerceError> {
        let available = self.available_for(talla).ok_or_else(|| {
            CommerceError::VariantNotFound(format!(
                "{} talla {}",
                product_id,
                talla.unwrap_or("-")
            ))
        })?;
        if quantity > available {
            return Err(CommerceError::InsufficientInventory {
                product_id: product_id.to_string(),
                requested: quantity,
                available,
            });
        }
        Ok(())
    }

    /// Nothing left in any size. A product without variants counts as sold
    /// out.
    pub fn is_sold_out(&self) -> bool {
        self.total() == 0
    }

    /// Check if stock is at or below `threshold`.
    pub fn is_low_stock(&self, threshold: u64) -> bool {
        self.total() <= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variants() -> Vec<Variant> {
        vec![
            Variant::new(Some("S"), 40),
            Variant::new(Some("M"), 60),
            Variant::new(Some("L"), 0),
            Variant::new(Some("M"), 5),
        ]
    }

    #[test]
    fn test_total_and_by_size() {
        let v = variants();
        let stock = StockLevels::new(&v);
        assert_eq!(stock.total(), 105);

        let by_size = stock.by_size();
        assert_eq!(by_size.get(&Some("M".to_string())), Some(&65));
        assert_eq!(by_size.get(&Some("L".to_string())), Some(&0));
        assert_eq!(stock.sizes(), vec!["S", "M", "L"]);
    }

    #[test]
    fn test_available_for() {
        let v = variants();
        let stock = StockLevels::new(&v);
        assert_eq!(stock.available_for(Some("S")), Some(40));
        assert_eq!(stock.available_for(Some("XL")), None);
        assert_eq!(stock.available_for(None), Some(105));
    }

    #[test]
    fn test_ensure_available() {
        let v = variants();
        let stock = StockLevels::new(&v);
        let id = ProductId::new("1");

        assert!(stock.ensure_available(&id, Some("S"), 40).is_ok());
        assert!(matches!(
            stock.ensure_available(&id, Some("S"), 41),
            Err(CommerceError::InsufficientInventory { available: 40, .. })
        ));
        assert!(matches!(
            stock.ensure_available(&id, Some("L"), 1),
            Err(CommerceError::InsufficientInventory { available: 0, .. })
        ));
        assert!(matches!(
            stock.ensure_available(&id, Some("XXL"), 1),
            Err(CommerceError::VariantNotFound(_))
        ));
    }

    #[test]
    fn test_sold_out() {
        assert!(StockLevels::new(&[]).is_sold_out());
        let v = vec![Variant::new(Some("U"), 0)];
        assert!(StockLevels::new(&v).is_sold_out());
        assert!(!StockLevels::new(&variants()).is_sold_out());
    }

    #[test]
    fn test_blank_size_is_none() {
        let v = Variant::new(Some("  "), 3);
        assert_eq!(v.talla, None);
    }

    #[test]
    fn test_low_stock() {
        let v = vec![Variant::new(Some("M"), 4)];
        assert!(StockLevels::new(&v).is_low_stock(5));
        assert!(!StockLevels::new(&v).is_low_stock(3));
    }
}
