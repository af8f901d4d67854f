//! Inventory Module
//!
//! 库存按 (颜色, 尺码) 逐项计数。预留/释放是纯内存操作，由
//! [`ProductLocks`] 串行化同一商品的并发预留，落库走
//! [`crate::db::repository::ProductRepository::update_inventory`]。

pub mod ledger;
pub mod locks;

pub use ledger::LedgerError;
pub use locks::ProductLocks;
