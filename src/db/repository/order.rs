//! Order Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Order, OrderStatus};

// "order" 是 SurrealQL 关键字，表名用复数避开
const TABLE: &str = "orders";

#[derive(serde::Deserialize)]
struct CountRow {
    total: i64,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn db(&self) -> &Surreal<Db> {
        self.base.db()
    }

    /// Parse an API-supplied order id
    pub fn record_id(id: &str) -> RepoResult<RecordId> {
        parse_record_id(TABLE, id)
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Order> {
        let order: Option<Order> = self.db().select(id.clone()).await?;
        order.ok_or_else(|| RepoError::NotFound(format!("Order not found: {id}")))
    }

    /// All orders, newest first (admin view)
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .db()
            .query("SELECT * FROM type::table($table) ORDER BY created_at DESC")
            .bind(("table", TABLE))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Orders placed by one user, newest first
    ///
    /// `user` 字段以 "table:id" 字符串入库 (见 serde_helpers)，比较时同样用字符串
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .db()
            .query("SELECT * FROM type::table($table) WHERE user = $user ORDER BY created_at DESC")
            .bind(("table", TABLE))
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// How many orders a user has placed, used for the first-order discount
    pub async fn count_by_user(&self, user: &RecordId) -> RepoResult<i64> {
        let row: Option<CountRow> = self
            .db()
            .query("SELECT count() AS total FROM type::table($table) WHERE user = $user GROUP ALL")
            .bind(("table", TABLE))
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(row.map(|r| r.total).unwrap_or(0))
    }

    /// Persist a status transition, optionally attaching a tracking number
    pub async fn update_status(
        &self,
        id: &RecordId,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> RepoResult<Order> {
        let updated: Option<Order> = match tracking_number {
            Some(tracking) => {
                self.db()
                    .query("UPDATE $thing SET status = $status, tracking_number = $tracking RETURN AFTER")
                    .bind(("thing", id.clone()))
                    .bind(("status", status))
                    .bind(("tracking", tracking))
                    .await?
                    .take(0)?
            }
            None => {
                self.db()
                    .query("UPDATE $thing SET status = $status RETURN AFTER")
                    .bind(("thing", id.clone()))
                    .bind(("status", status))
                    .await?
                    .take(0)?
            }
        };
        updated.ok_or_else(|| RepoError::NotFound(format!("Order not found: {id}")))
    }
}
