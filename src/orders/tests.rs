//! Order pipeline and lifecycle tests against an in-memory database.

use std::sync::Arc;

use surrealdb::RecordId;

use super::OrderService;
use crate::auth::CurrentUser;
use crate::db::DbService;
use crate::db::models::{
    CartItemRequest, ColorOption, CustomerInfo, InventoryEntry, Order, OrderCreateRequest,
    OrderStatus, PaymentMethod, PaymentReceipt, Product, ProductCreate, ShippingAddress,
    SizeOption, StatusUpdateRequest, User,
};
use crate::db::repository::{ProductRepository, UserRepository};
use crate::inventory::ProductLocks;
use crate::notify::NoopNotifier;
use crate::utils::AppError;

async fn service() -> (DbService, OrderService) {
    let db = DbService::memory().await.unwrap();
    let service = OrderService::new(
        db.db.clone(),
        Arc::new(ProductLocks::new()),
        Arc::new(NoopNotifier),
        "admin@example.com",
    );
    (db, service)
}

async fn seed_product(db: &DbService, name: &str, price: f64, stock: i64) -> Product {
    let repo = ProductRepository::new(db.db.clone());
    repo.create(ProductCreate {
        name: name.to_string(),
        description: None,
        price,
        category: "scrubs".to_string(),
        gender: None,
        colors: Some(vec![ColorOption {
            name: "Red".to_string(),
            code: "#B3252C".to_string(),
            is_available: true,
        }]),
        sizes: Some(vec![SizeOption {
            name: "M".to_string(),
            is_available: true,
        }]),
        inventory: Some(vec![InventoryEntry {
            color: "Red".to_string(),
            size: "M".to_string(),
            stock,
        }]),
    })
    .await
    .unwrap()
}

async fn seed_user(db: &DbService, points: i64, verified_student: bool) -> (User, CurrentUser) {
    let repo = UserRepository::new(db.db.clone());
    let mut user = User::new("ayesha", "ayesha@example.com");
    user.reward_points = points;
    user.is_student = verified_student;
    user.student_verified = verified_student;
    let created = repo.create(user).await.unwrap();
    let current = CurrentUser {
        id: created.id.as_ref().unwrap().to_string(),
        username: created.username.clone(),
        email: created.email.clone(),
        role: created.role.clone(),
    };
    (created, current)
}

fn cart(product: &Product, quantity: i64) -> OrderCreateRequest {
    OrderCreateRequest {
        customer_info: CustomerInfo {
            name: Some("Ayesha Khan".to_string()),
            email: Some("ayesha@example.com".to_string()),
        },
        items: vec![CartItemRequest {
            product: product.id.as_ref().unwrap().to_string(),
            color: "Red".to_string(),
            size: "M".to_string(),
            quantity,
        }],
        shipping_address: ShippingAddress {
            full_name: "Ayesha Khan".to_string(),
            address_line1: "12 Mall Road".to_string(),
            city: "Lahore".to_string(),
            postal_code: "54000".to_string(),
            country: "PK".to_string(),
            phone_number: "+92-300-0000000".to_string(),
            ..Default::default()
        },
        payment_method: PaymentMethod::CashOnDelivery,
        points_to_use: 0,
        notes: None,
    }
}

async fn reload(db: &DbService, product: &Product) -> Product {
    ProductRepository::new(db.db.clone())
        .find_by_id(product.id.as_ref().unwrap())
        .await
        .unwrap()
}

async fn reload_user(db: &DbService, id: &RecordId) -> User {
    UserRepository::new(db.db.clone())
        .find_by_id(id)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_order_reserves_stock() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 5).await;

    let order = service.create_order(cart(&product, 3), None, None).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items[0].quantity, 3);

    let after = reload(&db, &product).await;
    assert_eq!(after.variant_stock("Red", "M"), 2);
    assert_eq!(after.total_stock, 2);
}

#[tokio::test]
async fn test_insufficient_stock_persists_nothing() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 2).await;

    let err = service.create_order(cart(&product, 3), None, None).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    let after = reload(&db, &product).await;
    assert_eq!(after.variant_stock("Red", "M"), 2);
    assert!(service.all_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_first_order_discount_applied() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 10).await;
    let (_, current) = seed_user(&db, 0, false).await;

    let order = service
        .create_order(cart(&product, 2), None, Some(&current))
        .await
        .unwrap();

    assert_eq!(order.subtotal, 1000.0);
    assert_eq!(order.discount, 100.0);
    assert_eq!(order.discount_code, "First Order Discount (10%)");
    assert_eq!(order.total, 900.0);
    assert_eq!(order.points_earned, 9);
    assert!(order.is_first_order);
}

#[tokio::test]
async fn test_student_second_order_with_points() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 20).await;
    let (user, current) = seed_user(&db, 100, true).await;
    let user_id = user.id.clone().unwrap();

    // first order burns the first-order discount
    service
        .create_order(cart(&product, 1), None, Some(&current))
        .await
        .unwrap();
    let balance_after_first = reload_user(&db, &user_id).await.reward_points;

    let mut request = cart(&product, 2);
    request.points_to_use = 50;
    let order = service.create_order(request, None, Some(&current)).await.unwrap();

    assert_eq!(order.subtotal, 1000.0);
    assert_eq!(order.discount, 50.0);
    assert_eq!(order.discount_code, "Student Discount (5%)");
    assert_eq!(order.points_used, 50);
    assert_eq!(order.total, 900.0);
    assert_eq!(order.points_earned, 9);
    assert!(!order.is_first_order);

    let balance = reload_user(&db, &user_id).await.reward_points;
    assert_eq!(balance, balance_after_first - 50 + 9);
}

#[tokio::test]
async fn test_points_over_balance_rejected() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 5).await;
    let (_, current) = seed_user(&db, 10, false).await;

    let mut request = cart(&product, 1);
    request.points_to_use = 50;
    let err = service
        .create_order(request, None, Some(&current))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    // rejected before any reservation
    assert_eq!(reload(&db, &product).await.variant_stock("Red", "M"), 5);
}

#[tokio::test]
async fn test_cancel_releases_stock_and_reverses_points() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 5).await;
    let (user, current) = seed_user(&db, 100, false).await;
    let user_id = user.id.clone().unwrap();

    let mut request = cart(&product, 3);
    request.points_to_use = 20;
    let order = service.create_order(request, None, Some(&current)).await.unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();

    let cancelled = service.cancel(&order_id, &current).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let after = reload(&db, &product).await;
    assert_eq!(after.variant_stock("Red", "M"), 5);
    assert_eq!(after.total_stock, 5);

    // settle then reverse nets out to the starting balance
    assert_eq!(reload_user(&db, &user_id).await.reward_points, 100);
}

#[tokio::test]
async fn test_cancel_shipped_order_rejected() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 5).await;
    let (_, current) = seed_user(&db, 0, false).await;

    let order = service
        .create_order(cart(&product, 2), None, Some(&current))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();

    service
        .update_status(
            &order_id,
            StatusUpdateRequest {
                status: OrderStatus::Shipped,
                tracking_number: Some("TRK-1".to_string()),
            },
        )
        .await
        .unwrap();

    let err = service.cancel(&order_id, &current).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    // nothing released
    assert_eq!(reload(&db, &product).await.variant_stock("Red", "M"), 3);
}

#[tokio::test]
async fn test_failed_later_line_releases_earlier_reservations() {
    let (db, service) = service().await;
    let plenty = seed_product(&db, "Scrub Top", 500.0, 10).await;
    let scarce = seed_product(&db, "Scrub Cap", 300.0, 1).await;

    let mut request = cart(&plenty, 4);
    request.items.push(CartItemRequest {
        product: scarce.id.as_ref().unwrap().to_string(),
        color: "Red".to_string(),
        size: "M".to_string(),
        quantity: 2,
    });

    let err = service.create_order(request, None, None).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    assert_eq!(reload(&db, &plenty).await.variant_stock("Red", "M"), 10);
    assert_eq!(reload(&db, &scarce).await.variant_stock("Red", "M"), 1);
    assert!(service.all_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_guest_checkout_gets_no_discounts_or_points() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 5).await;

    let mut request = cart(&product, 2);
    request.points_to_use = 50;
    let order = service.create_order(request, None, None).await.unwrap();

    assert!(order.user.is_none());
    assert_eq!(order.discount, 0.0);
    assert_eq!(order.points_used, 0);
    assert_eq!(order.total, 1000.0);
    assert!(!order.is_first_order);
}

#[tokio::test]
async fn test_bank_transfer_requires_receipt() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 5).await;

    let mut request = cart(&product, 2);
    request.payment_method = PaymentMethod::BankTransfer;
    let err = service.create_order(request, None, None).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    // reservation compensated
    assert_eq!(reload(&db, &product).await.variant_stock("Red", "M"), 5);

    let mut request = cart(&product, 2);
    request.payment_method = PaymentMethod::BankTransfer;
    let order = service
        .create_order(
            request,
            Some(PaymentReceipt {
                url: "http://localhost:3000/uploads/order-payment/guest/r.png".to_string(),
                public_id: "order-payment/guest/r.png".to_string(),
                uploaded: true,
            }),
            None,
        )
        .await
        .unwrap();
    assert!(order.payment_receipt.is_some());
}

#[tokio::test]
async fn test_update_status_rejects_cancelled_target() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 5).await;
    let order = service.create_order(cart(&product, 1), None, None).await.unwrap();

    let err = service
        .update_status(
            &order.id.as_ref().unwrap().to_string(),
            StatusUpdateRequest {
                status: OrderStatus::Cancelled,
                tracking_number: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
}

#[tokio::test]
async fn test_update_status_persists_tracking_number() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 5).await;
    let order = service.create_order(cart(&product, 1), None, None).await.unwrap();

    let updated = service
        .update_status(
            &order.id.as_ref().unwrap().to_string(),
            StatusUpdateRequest {
                status: OrderStatus::Shipped,
                tracking_number: Some("TRK-42".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);
    assert_eq!(updated.tracking_number.as_deref(), Some("TRK-42"));
}

#[tokio::test]
async fn test_cancel_requires_owner_or_admin() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 5).await;
    let (_, owner) = seed_user(&db, 0, false).await;

    let order = service
        .create_order(cart(&product, 1), None, Some(&owner))
        .await
        .unwrap();
    let order_id = order.id.as_ref().unwrap().to_string();

    let stranger_user = UserRepository::new(db.db.clone())
        .create(User::new("bilal", "bilal@example.com"))
        .await
        .unwrap();
    let stranger = CurrentUser {
        id: stranger_user.id.as_ref().unwrap().to_string(),
        username: stranger_user.username.clone(),
        email: stranger_user.email.clone(),
        role: stranger_user.role.clone(),
    };

    let err = service.cancel(&order_id, &stranger).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let admin = CurrentUser {
        id: stranger.id.clone(),
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        role: "admin".to_string(),
    };
    let cancelled = service.cancel(&order_id, &admin).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_my_orders_scoped_to_caller() {
    let (db, service) = service().await;
    let product = seed_product(&db, "Scrub Top", 500.0, 10).await;
    let (_, ayesha) = seed_user(&db, 0, false).await;

    service.create_order(cart(&product, 1), None, Some(&ayesha)).await.unwrap();
    service.create_order(cart(&product, 1), None, None).await.unwrap();

    let orders: Vec<Order> = service.orders_for(&ayesha).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(service.all_orders().await.unwrap().len(), 2);
}
