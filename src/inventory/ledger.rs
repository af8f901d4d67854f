//! Inventory Ledger Operations
//!
//! 对商品库存矩阵的内存操作。调用方负责持锁并在成功后写回数据库。

use thiserror::Error;

use crate::db::models::{InventoryEntry, Product};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient stock for {color} / {size}: {available} available, {requested} requested")]
    InsufficientStock {
        color: String,
        size: String,
        available: i64,
        requested: i64,
    },

    #[error("No such variant: {color} / {size}")]
    UnknownVariant { color: String, size: String },
}

impl Product {
    fn entry_mut(&mut self, color: &str, size: &str) -> Option<&mut InventoryEntry> {
        self.inventory
            .iter_mut()
            .find(|e| e.color == color && e.size == size)
    }

    /// Current stock of one variant; 0 when the variant does not exist
    pub fn variant_stock(&self, color: &str, size: &str) -> i64 {
        self.inventory
            .iter()
            .find(|e| e.color == color && e.size == size)
            .map(|e| e.stock)
            .unwrap_or(0)
    }

    pub fn has_sufficient_stock(&self, color: &str, size: &str, quantity: i64) -> bool {
        self.variant_stock(color, size) >= quantity
    }

    /// Decrement one variant's stock. Fails without mutating on unknown
    /// variant or insufficient stock.
    pub fn reserve(&mut self, color: &str, size: &str, quantity: i64) -> Result<(), LedgerError> {
        let entry = self
            .entry_mut(color, size)
            .ok_or_else(|| LedgerError::UnknownVariant {
                color: color.to_string(),
                size: size.to_string(),
            })?;
        if entry.stock < quantity {
            return Err(LedgerError::InsufficientStock {
                color: color.to_string(),
                size: size.to_string(),
                available: entry.stock,
                requested: quantity,
            });
        }
        entry.stock -= quantity;
        self.total_stock -= quantity;
        Ok(())
    }

    /// Return reserved stock to a variant. A variant that has since been
    /// removed from the matrix is skipped with a warning, cancellation
    /// must not fail on a drifted catalog.
    pub fn release(&mut self, color: &str, size: &str, quantity: i64) {
        match self.entry_mut(color, size) {
            Some(entry) => {
                entry.stock += quantity;
                self.total_stock += quantity;
            }
            None => {
                tracing::warn!(
                    "Release skipped, variant no longer exists: {color} / {size} (qty {quantity})"
                );
            }
        }
    }

    /// Set (or insert) one variant's absolute stock level
    pub fn set_variant_stock(&mut self, color: &str, size: &str, stock: i64) {
        match self.entry_mut(color, size) {
            Some(entry) => entry.stock = stock,
            None => self.inventory.push(InventoryEntry {
                color: color.to_string(),
                size: size.to_string(),
                stock,
            }),
        }
        self.recalculate_total_stock();
    }

    /// Recompute the denormalized total from the per-variant counters
    pub fn recalculate_total_stock(&mut self) -> i64 {
        self.total_stock = self.inventory.iter().map(|e| e.stock).sum();
        self.total_stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        let mut product = Product {
            id: None,
            name: "Scrub Top".to_string(),
            description: String::new(),
            price: 2500.0,
            category: "scrubs".to_string(),
            gender: String::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
            inventory: vec![
                InventoryEntry {
                    color: "Navy".to_string(),
                    size: "S".to_string(),
                    stock: 5,
                },
                InventoryEntry {
                    color: "Navy".to_string(),
                    size: "M".to_string(),
                    stock: 2,
                },
            ],
            total_stock: 0,
            is_active: true,
            created_at: None,
        };
        product.recalculate_total_stock();
        product
    }

    #[test]
    fn test_reserve_decrements_variant_and_total() {
        let mut p = product();
        p.reserve("Navy", "S", 3).unwrap();
        assert_eq!(p.variant_stock("Navy", "S"), 2);
        assert_eq!(p.total_stock, 4);
    }

    #[test]
    fn test_reserve_insufficient_stock_leaves_product_untouched() {
        let mut p = product();
        let err = p.reserve("Navy", "M", 3).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientStock {
                color: "Navy".to_string(),
                size: "M".to_string(),
                available: 2,
                requested: 3,
            }
        );
        assert_eq!(p.variant_stock("Navy", "M"), 2);
        assert_eq!(p.total_stock, 7);
    }

    #[test]
    fn test_reserve_unknown_variant() {
        let mut p = product();
        let err = p.reserve("Navy", "XL", 1).unwrap_err();
        assert!(matches!(err, LedgerError::UnknownVariant { .. }));
    }

    #[test]
    fn test_release_restores_stock() {
        let mut p = product();
        p.reserve("Navy", "S", 5).unwrap();
        p.release("Navy", "S", 5);
        assert_eq!(p.variant_stock("Navy", "S"), 5);
        assert_eq!(p.total_stock, 7);
    }

    #[test]
    fn test_release_on_removed_variant_is_noop() {
        let mut p = product();
        p.inventory.retain(|e| e.size != "M");
        p.recalculate_total_stock();
        p.release("Navy", "M", 2);
        assert_eq!(p.variant_stock("Navy", "M"), 0);
        assert_eq!(p.total_stock, 5);
    }

    #[test]
    fn test_set_variant_stock_overwrites_and_resums() {
        let mut p = product();
        p.set_variant_stock("Navy", "S", 10);
        assert_eq!(p.variant_stock("Navy", "S"), 10);
        assert_eq!(p.total_stock, 12);

        p.set_variant_stock("Navy", "L", 4);
        assert_eq!(p.variant_stock("Navy", "L"), 4);
        assert_eq!(p.total_stock, 16);
    }
}
