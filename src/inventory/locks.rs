//! Per-Product Lock Registry
//!
//! 同一商品的「检查库存 → 扣减 → 写回」必须串行，否则并发下单会
//! 超卖。锁按商品 id 懒创建，进程生命周期内保留。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// Lazily-created async mutex per product id
#[derive(Default)]
pub struct ProductLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ProductLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or create) the lock guarding one product's inventory
    pub fn lock_for(&self, product_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(product_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_product_shares_one_lock() {
        let locks = ProductLocks::new();
        let a = locks.lock_for("product:tee");
        let b = locks.lock_for("product:tee");
        assert!(Arc::ptr_eq(&a, &b));

        let other = locks.lock_for("product:cap");
        assert!(!Arc::ptr_eq(&a, &other));
    }

    #[tokio::test]
    async fn test_lock_serializes_critical_sections() {
        let locks = Arc::new(ProductLocks::new());
        let counter = Arc::new(Mutex::new(0i64));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let lock = locks.lock_for("product:tee");
                let _guard = lock.lock().await;
                let mut n = counter.lock().await;
                *n += 1;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*counter.lock().await, 16);
    }
}
