//! Checkout Pipeline
//!
//! 步骤固定：校验购物车 → 逐行预留库存 (持商品锁) → 计算折扣 →
//! 校验回执 → 落库订单 → 结算积分 → 异步通知。任何一步失败都会把
//! 已预留的行按逆序释放回去，不留悬挂扣减。

use rust_decimal::Decimal;
use validator::Validate;

use super::{OrderService, ReservedLine};
use crate::auth::CurrentUser;
use crate::db::models::{
    DiscountPreview, DiscountPreviewRequest, Order, OrderCreateRequest, OrderItem, OrderStatus,
    PaymentMethod, PaymentReceipt, User,
};
use crate::db::repository::{ProductRepository, UserRepository};
use crate::notify::{messages, send_in_background};
use crate::pricing::{DiscountProfile, compute_discount, to_decimal, to_f64};
use crate::utils::{AppError, AppResult};

impl OrderService {
    /// Create an order end to end. `receipt` must already be in object
    /// storage; it is only attached here.
    pub async fn create_order(
        &self,
        request: OrderCreateRequest,
        receipt: Option<PaymentReceipt>,
        current_user: Option<&CurrentUser>,
    ) -> AppResult<Order> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // 游客可下单，但没有积分也没有首单优惠
        let user = match current_user {
            Some(cu) => {
                let id = UserRepository::record_id(&cu.id)?;
                Some(self.users.find_by_id(&id).await?)
            }
            None => None,
        };

        let points_to_use = match &user {
            Some(u) => {
                if request.points_to_use > u.reward_points {
                    return Err(AppError::BusinessRule(format!(
                        "Cannot use more points than available. You have {} points.",
                        u.reward_points
                    )));
                }
                request.points_to_use.max(0)
            }
            None => 0,
        };

        // 逐行预留。失败时释放已预留的行再返回错误。
        let mut reserved: Vec<ReservedLine> = Vec::new();
        let mut items: Vec<OrderItem> = Vec::new();
        for line in &request.items {
            match self.reserve_line(line).await {
                Ok((reservation, item)) => {
                    reserved.push(reservation);
                    items.push(item);
                }
                Err(e) => {
                    self.release_lines(&reserved).await;
                    return Err(e);
                }
            }
        }

        let subtotal = items.iter().fold(Decimal::ZERO, |acc, item| {
            acc + to_decimal(item.unit_price) * Decimal::from(item.quantity)
        });

        let is_first_order = match (&user, user.as_ref().and_then(|u| u.id.as_ref())) {
            (Some(_), Some(id)) => self.orders.count_by_user(id).await? == 0,
            _ => false,
        };
        let profile = DiscountProfile {
            is_first_order,
            is_verified_student: user
                .as_ref()
                .map(|u| u.is_verified_student())
                .unwrap_or(false),
        };
        let breakdown = compute_discount(to_f64(subtotal), points_to_use, profile);

        if request.payment_method == PaymentMethod::BankTransfer && receipt.is_none() {
            self.release_lines(&reserved).await;
            return Err(AppError::BusinessRule(
                "Payment receipt is required for bank transfers".to_string(),
            ));
        }

        let order = Order {
            id: None,
            user: user.as_ref().and_then(|u| u.id.clone()),
            items,
            shipping_address: request.shipping_address,
            subtotal: breakdown.subtotal,
            discount: breakdown.discount_amount,
            discount_code: breakdown.discount_reason,
            points_used: breakdown.points_used,
            points_earned: breakdown.points_earned,
            total: breakdown.total,
            payment_method: request.payment_method,
            payment_receipt: receipt,
            status: OrderStatus::Pending,
            tracking_number: None,
            notes: request.notes,
            is_first_order,
            created_at: Some(chrono::Utc::now()),
        };

        let saved = match self.orders.create(order).await {
            Ok(saved) => saved,
            Err(e) => {
                self.release_lines(&reserved).await;
                return Err(e.into());
            }
        };

        if let Some(id) = user.as_ref().and_then(|u| u.id.as_ref()) {
            self.loyalty
                .settle(id, saved.points_used, saved.points_earned)
                .await?;
        }

        self.notify_order_created(&saved, &user, request.customer_info.email.as_deref());

        tracing::info!(
            "Order created: {} total={} items={}",
            saved.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
            saved.total,
            saved.items.len()
        );
        Ok(saved)
    }

    /// Preview pricing for the cart page, no side effects
    pub async fn preview_discount(
        &self,
        current_user: &CurrentUser,
        request: DiscountPreviewRequest,
    ) -> AppResult<DiscountPreview> {
        let id = UserRepository::record_id(&current_user.id)?;
        let user = self.users.find_by_id(&id).await?;

        if request.points_to_use > user.reward_points {
            return Err(AppError::BusinessRule(format!(
                "Cannot use more points than available. You have {} points.",
                user.reward_points
            )));
        }

        let is_first_order = match &user.id {
            Some(uid) => self.orders.count_by_user(uid).await? == 0,
            None => false,
        };
        let breakdown = compute_discount(
            request.subtotal,
            request.points_to_use,
            DiscountProfile {
                is_first_order,
                is_verified_student: user.is_verified_student(),
            },
        );

        Ok(DiscountPreview {
            subtotal: breakdown.subtotal,
            discount_amount: breakdown.discount_amount,
            discount_reason: breakdown.discount_reason,
            points_to_use: breakdown.points_used,
            points_earned: breakdown.points_earned,
            total: breakdown.total,
        })
    }

    /// Reserve one cart line under the product's lock and snapshot it
    async fn reserve_line(
        &self,
        line: &crate::db::models::CartItemRequest,
    ) -> AppResult<(ReservedLine, OrderItem)> {
        let product_id = ProductRepository::record_id(&line.product)?;

        let lock = self.locks.lock_for(&product_id.to_string());
        let _guard = lock.lock().await;

        let mut product = self.products.find_by_id(&product_id).await?;
        product
            .reserve(&line.color, &line.size, line.quantity)
            .map_err(|_| {
                AppError::BusinessRule(format!(
                    "{} is out of stock or has insufficient quantity",
                    product.name
                ))
            })?;

        let total = product.total_stock;
        let inventory = product.inventory.clone();
        self.products
            .update_inventory(&product_id, inventory, total)
            .await?;

        Ok((
            ReservedLine {
                product: product_id.clone(),
                color: line.color.clone(),
                size: line.size.clone(),
                quantity: line.quantity,
            },
            OrderItem {
                product: product_id,
                product_name: product.name,
                color: line.color.clone(),
                size: line.size.clone(),
                quantity: line.quantity,
                unit_price: product.price,
            },
        ))
    }

    fn notify_order_created(&self, order: &Order, user: &Option<User>, guest_email: Option<&str>) {
        let email = guest_email
            .map(String::from)
            .or_else(|| user.as_ref().map(|u| u.email.clone()));
        let Some(email) = email else {
            return;
        };

        send_in_background(
            self.notifier.clone(),
            messages::order_confirmation(order, &email),
        );
        send_in_background(
            self.notifier.clone(),
            messages::new_order_admin(order, &self.admin_email, &email),
        );
    }
}
