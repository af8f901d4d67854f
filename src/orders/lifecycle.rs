//! Order Lifecycle / Status Machine
//!
//! Pending → Processing → Shipped → Delivered；Pending/Processing 可取消。
//! 取消必须走 [`OrderService::cancel`]，它会释放库存并冲正积分，
//! 所以 update_status 拒绝 Cancelled 目标。

use surrealdb::RecordId;

use super::{OrderService, ReservedLine};
use crate::auth::CurrentUser;
use crate::db::models::{Order, OrderStatus, StatusUpdateRequest};
use crate::db::repository::{OrderRepository, UserRepository};
use crate::notify::{messages, send_in_background};
use crate::utils::{AppError, AppResult};

impl OrderService {
    pub async fn get_order(&self, order_id: &str, actor: &CurrentUser) -> AppResult<Order> {
        let id = OrderRepository::record_id(order_id)?;
        let order = self.orders.find_by_id(&id).await?;
        self.authorize(&order, actor)?;
        Ok(order)
    }

    pub async fn orders_for(&self, actor: &CurrentUser) -> AppResult<Vec<Order>> {
        let user = UserRepository::record_id(&actor.id)?;
        Ok(self.orders.find_by_user(&user).await?)
    }

    /// Full order book (admin)
    pub async fn all_orders(&self) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_all().await?)
    }

    /// Admin status transition. Notification goes out only when the
    /// status actually changed; the tracking number is always persisted.
    pub async fn update_status(
        &self,
        order_id: &str,
        request: StatusUpdateRequest,
    ) -> AppResult<Order> {
        if request.status == OrderStatus::Cancelled {
            return Err(AppError::BusinessRule(
                "Use the cancel endpoint to cancel an order".to_string(),
            ));
        }

        let id = OrderRepository::record_id(order_id)?;
        let current = self.orders.find_by_id(&id).await?;
        let changed = current.status != request.status;

        let updated = self
            .orders
            .update_status(&id, request.status, request.tracking_number)
            .await?;

        if changed {
            self.notify_owner(&updated).await;
        }
        Ok(updated)
    }

    /// Cancel an order (owner or admin). Releases every line's stock,
    /// reverses the loyalty settlement, then flips the status.
    pub async fn cancel(&self, order_id: &str, actor: &CurrentUser) -> AppResult<Order> {
        let id = OrderRepository::record_id(order_id)?;
        let order = self.orders.find_by_id(&id).await?;
        self.authorize(&order, actor)?;

        if !order.status.can_cancel() {
            return Err(AppError::BusinessRule(format!(
                "Order cannot be cancelled in {} status",
                order.status
            )));
        }

        let lines: Vec<ReservedLine> = order
            .items
            .iter()
            .map(|item| ReservedLine {
                product: item.product.clone(),
                color: item.color.clone(),
                size: item.size.clone(),
                quantity: item.quantity,
            })
            .collect();
        self.release_lines(&lines).await;

        if let Some(user) = &order.user {
            if order.points_used > 0 || order.points_earned > 0 {
                self.loyalty
                    .reverse(user, order.points_used, order.points_earned)
                    .await?;
            }
        }

        let cancelled = self
            .orders
            .update_status(&id, OrderStatus::Cancelled, None)
            .await?;

        tracing::info!("Order cancelled: {id}");
        self.notify_owner(&cancelled).await;
        Ok(cancelled)
    }

    fn authorize(&self, order: &Order, actor: &CurrentUser) -> AppResult<()> {
        if actor.is_admin() {
            return Ok(());
        }
        let actor_id: Option<RecordId> = UserRepository::record_id(&actor.id).ok();
        if order.user.is_some() && order.user == actor_id {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "Not authorized to access this order".to_string(),
        ))
    }

    /// Send a status email to the owning user, if any (guests have no
    /// stored address)
    async fn notify_owner(&self, order: &Order) {
        let Some(user_id) = &order.user else {
            return;
        };
        match self.users.find_by_id(user_id).await {
            Ok(user) => {
                send_in_background(self.notifier.clone(), messages::status_update(order, &user.email));
            }
            Err(e) => {
                tracing::warn!("Status email skipped, owner {user_id} not loadable: {e}");
            }
        }
    }
}
