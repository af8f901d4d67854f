//! Order Model
//!
//! 订单持有创建时刻的快照 (商品名、单价)，之后只有 `status` 和
//! `tracking_number` 会变化。状态机见 [`crate::orders::lifecycle`]。

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

pub type OrderId = RecordId;

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// 只有 Pending / Processing 可以取消
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    #[serde(rename = "cash-on-delivery")]
    CashOnDelivery,
    #[serde(rename = "bank-transfer")]
    BankTransfer,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentMethod::CashOnDelivery => "cash-on-delivery",
            PaymentMethod::BankTransfer => "bank-transfer",
        };
        f.write_str(s)
    }
}

/// Payment receipt (bank transfer only), stored via object storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub url: String,
    pub public_id: String,
    #[serde(default)]
    pub uploaded: bool,
}

/// Shipping address snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone_number: String,
}

/// Order line item — immutable snapshot taken at creation time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub product_name: String,
    pub color: String,
    pub size: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<OrderId>,
    /// Owning user; None for guest checkout
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub user: Option<RecordId>,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub subtotal: f64,
    #[serde(default)]
    pub discount: f64,
    /// Human-readable discount reasons joined with " + "
    #[serde(default)]
    pub discount_code: String,
    #[serde(default)]
    pub points_used: i64,
    #[serde(default)]
    pub points_earned: i64,
    pub total: f64,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_receipt: Option<PaymentReceipt>,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_first_order: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// API Request Types
// =============================================================================

/// One cart line in a create-order request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartItemRequest {
    /// Product id ("product:xxx")
    pub product: String,
    pub color: String,
    pub size: String,
    #[validate(range(min = 1, message = "Quantity cannot be less than 1"))]
    pub quantity: i64,
}

/// Contact info for notifications (guests supply it explicitly)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateRequest {
    #[serde(default)]
    pub customer_info: CustomerInfo,
    #[validate(length(min = 1, message = "No items in order"))]
    #[validate(nested)]
    pub items: Vec<CartItemRequest>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub points_to_use: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Update status payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// Discount preview request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPreviewRequest {
    pub subtotal: f64,
    #[serde(default)]
    pub points_to_use: i64,
}

/// Discount preview response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPreview {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub discount_reason: String,
    pub points_to_use: i64,
    pub points_earned: i64,
    pub total: f64,
}
