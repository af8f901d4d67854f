//! Orders Module
//!
//! 下单流水线 ([`pipeline`]) 与状态机/取消 ([`lifecycle`])。
//! 两者共享同一个 [`OrderService`]，库存写入都经过商品锁。

pub mod lifecycle;
pub mod pipeline;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use crate::db::repository::{OrderRepository, ProductRepository, UserRepository};
use crate::inventory::ProductLocks;
use crate::loyalty::LoyaltyLedger;
use crate::notify::Notifier;

/// One applied reservation, remembered for compensation / cancellation
#[derive(Debug, Clone)]
pub(crate) struct ReservedLine {
    pub product: RecordId,
    pub color: String,
    pub size: String,
    pub quantity: i64,
}

pub struct OrderService {
    pub(crate) products: ProductRepository,
    pub(crate) orders: OrderRepository,
    pub(crate) users: UserRepository,
    pub(crate) loyalty: LoyaltyLedger,
    pub(crate) locks: Arc<ProductLocks>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) admin_email: String,
}

impl OrderService {
    pub fn new(
        db: Surreal<Db>,
        locks: Arc<ProductLocks>,
        notifier: Arc<dyn Notifier>,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            loyalty: LoyaltyLedger::new(db),
            locks,
            notifier,
            admin_email: admin_email.into(),
        }
    }

    /// Put reserved stock back, newest reservation first. Used both for
    /// pipeline compensation and for cancellation; failures are logged
    /// and the remaining lines still processed.
    pub(crate) async fn release_lines(&self, lines: &[ReservedLine]) {
        for line in lines.iter().rev() {
            let lock = self.locks.lock_for(&line.product.to_string());
            let _guard = lock.lock().await;

            match self.products.find_by_id(&line.product).await {
                Ok(mut product) => {
                    product.release(&line.color, &line.size, line.quantity);
                    let total = product.total_stock;
                    let inventory = product.inventory.clone();
                    if let Err(e) = self
                        .products
                        .update_inventory(&line.product, inventory, total)
                        .await
                    {
                        tracing::error!("Failed to persist release for {}: {e}", line.product);
                    }
                }
                Err(e) => {
                    tracing::warn!("Release skipped, product {} unavailable: {e}", line.product);
                }
            }
        }
    }
}
