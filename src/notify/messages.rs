//! Email Message Builders
//!
//! 纯函数，只拼内容不发送。

use super::EmailMessage;
use crate::db::models::{Order, OrderStatus, StudentVerification};

fn order_id(order: &Order) -> String {
    order
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default()
}

fn items_table(order: &Order) -> String {
    let mut rows = String::new();
    for item in &order.items {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{} / {}</td><td>{}</td><td>PKR {:.2}</td></tr>",
            item.product_name, item.color, item.size, item.quantity, item.unit_price
        ));
    }
    format!(
        "<table border=\"1\" cellpadding=\"6\">\
         <tr><th>Item</th><th>Variant</th><th>Qty</th><th>Unit Price</th></tr>{rows}</table>"
    )
}

fn totals_block(order: &Order) -> String {
    let discount_label = if order.discount_code.is_empty() {
        String::new()
    } else {
        format!(" ({})", order.discount_code)
    };
    format!(
        "<p><strong>Subtotal:</strong> PKR {:.2}</p>\
         <p><strong>Discount:</strong> PKR {:.2}{discount_label}</p>\
         <p><strong>Points Used:</strong> {}</p>\
         <p><strong>Total:</strong> PKR {:.2}</p>",
        order.subtotal, order.discount, order.points_used, order.total
    )
}

/// Confirmation sent to the buyer right after checkout
pub fn order_confirmation(order: &Order, to: &str) -> EmailMessage {
    let id = order_id(order);
    EmailMessage {
        to: to.to_string(),
        subject: format!("Order Confirmed #{id}"),
        html: format!(
            "<h2>Thank you for your order!</h2>\
             <p>Hi {},</p>\
             <p>Your order <strong>#{id}</strong> has been received.</p>\
             {}{}\
             <p>We will notify you when your order ships.</p>",
            order.shipping_address.full_name,
            items_table(order),
            totals_block(order),
        ),
    }
}

/// New-order alert for the back office
pub fn new_order_admin(order: &Order, admin_to: &str, customer_email: &str) -> EmailMessage {
    let id = order_id(order);
    EmailMessage {
        to: admin_to.to_string(),
        subject: format!("New Order #{id}"),
        html: format!(
            "<h2>New Order Received</h2>\
             <p><strong>Customer:</strong> {customer_email}</p>\
             <p><strong>Payment:</strong> {}</p>\
             {}{}",
            order.payment_method,
            items_table(order),
            totals_block(order),
        ),
    }
}

/// Status-change notice; only built when the status actually changed
pub fn status_update(order: &Order, to: &str) -> EmailMessage {
    let id = order_id(order);
    let (subject, status_message) = match order.status {
        OrderStatus::Processing => (
            format!("Order #{id} Status Update: {}", order.status),
            "Your order is now being processed. We are preparing your items for shipment."
                .to_string(),
        ),
        OrderStatus::Shipped => (
            format!("Order #{id} Status Update: {}", order.status),
            match &order.tracking_number {
                Some(tracking) => {
                    format!("Your order has been shipped! Your tracking number is: {tracking}")
                }
                None => "Your order has been shipped! You will receive tracking information shortly."
                    .to_string(),
            },
        ),
        OrderStatus::Delivered => (
            format!("Order #{id} Status Update: {}", order.status),
            "Your order has been delivered. We hope you enjoy your purchase!".to_string(),
        ),
        OrderStatus::Cancelled => (
            format!("Order #{id} Cancelled"),
            "Your order has been cancelled. If you have any questions, please contact our customer support."
                .to_string(),
        ),
        other => (
            format!("Order #{id} Status Update: {other}"),
            format!("Your order status has been updated to: {other}"),
        ),
    };

    EmailMessage {
        to: to.to_string(),
        subject,
        html: format!(
            "<h2>Order Status Update</h2>\
             <p>Hi {},</p>\
             <p>{status_message}</p>\
             <p><strong>Order ID:</strong> {id}</p>\
             <p><strong>New Status:</strong> {}</p>",
            order.shipping_address.full_name, order.status
        ),
    }
}

/// Alert to the back office when a student submits verification
pub fn verification_request(verification: &StudentVerification, admin_to: &str) -> EmailMessage {
    EmailMessage {
        to: admin_to.to_string(),
        subject: "New Student Verification Request".to_string(),
        html: format!(
            "<h2>New Student Verification Request</h2>\
             <p><strong>Student ID:</strong> {}</p>\
             <p><strong>Institution:</strong> {}</p>",
            verification.student_id, verification.institution_name
        ),
    }
}

/// Review outcome sent back to the student
pub fn verification_result(
    verification: &StudentVerification,
    to: &str,
    approved: bool,
) -> EmailMessage {
    if approved {
        EmailMessage {
            to: to.to_string(),
            subject: "Your Student Verification is Approved".to_string(),
            html: format!(
                "<h2>Student Verification Approved</h2>\
                 <p>Congratulations! Your student verification for {} has been approved.</p>\
                 <p>You now have access to all student benefits on our platform.</p>",
                verification.institution_name
            ),
        }
    } else {
        let reason = verification
            .rejection_reason
            .as_deref()
            .unwrap_or("No specific reason provided");
        EmailMessage {
            to: to.to_string(),
            subject: "Your Student Verification was Rejected".to_string(),
            html: format!(
                "<h2>Student Verification Rejected</h2>\
                 <p>We're sorry, but your student verification request has been rejected.</p>\
                 <p><strong>Reason:</strong> {reason}</p>\
                 <p>You may submit a new verification request with updated information.</p>"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{OrderItem, PaymentMethod, ShippingAddress};
    use surrealdb::RecordId;

    fn order(status: OrderStatus, tracking: Option<&str>) -> Order {
        Order {
            id: Some(RecordId::from_table_key("orders", "abc123")),
            user: None,
            items: vec![OrderItem {
                product: RecordId::from_table_key("product", "tee"),
                product_name: "Scrub Top".to_string(),
                color: "Navy".to_string(),
                size: "M".to_string(),
                quantity: 2,
                unit_price: 2500.0,
            }],
            shipping_address: ShippingAddress {
                full_name: "Ayesha Khan".to_string(),
                ..Default::default()
            },
            subtotal: 5000.0,
            discount: 500.0,
            discount_code: "First Order Discount (10%)".to_string(),
            points_used: 0,
            points_earned: 45,
            total: 4500.0,
            payment_method: PaymentMethod::CashOnDelivery,
            payment_receipt: None,
            status,
            tracking_number: tracking.map(String::from),
            notes: None,
            is_first_order: true,
            created_at: None,
        }
    }

    #[test]
    fn test_confirmation_includes_totals_and_reason() {
        let m = order_confirmation(&order(OrderStatus::Pending, None), "buyer@example.com");
        assert_eq!(m.subject, "Order Confirmed #orders:abc123");
        assert!(m.html.contains("PKR 4500.00"));
        assert!(m.html.contains("First Order Discount (10%)"));
    }

    #[test]
    fn test_shipped_update_mentions_tracking_number() {
        let m = status_update(&order(OrderStatus::Shipped, Some("TRK-99")), "buyer@example.com");
        assert!(m.subject.contains("Status Update: Shipped"));
        assert!(m.html.contains("TRK-99"));
    }

    #[test]
    fn test_cancelled_update_uses_cancelled_subject() {
        let m = status_update(&order(OrderStatus::Cancelled, None), "buyer@example.com");
        assert_eq!(m.subject, "Order #orders:abc123 Cancelled");
    }
}
