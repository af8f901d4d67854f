//! Database Models

// Serde helpers
pub mod serde_helpers;

// Shared
pub mod image_ref;

// Catalog
pub mod product;

// Orders
pub mod order;

// Users
pub mod student_verification;
pub mod user;

// Marketing
pub mod hero_image;

// Re-exports
pub use hero_image::HeroImage;
pub use image_ref::ImageRef;
pub use order::{
    CartItemRequest, CustomerInfo, DiscountPreview, DiscountPreviewRequest, Order,
    OrderCreateRequest, OrderId, OrderItem, OrderStatus, PaymentMethod, PaymentReceipt,
    ShippingAddress, StatusUpdateRequest,
};
pub use product::{
    ColorOption, InventoryEntry, Product, ProductCreate, ProductId, SizeOption, VariantStockUpdate,
};
pub use student_verification::{StudentVerification, VerificationReview, VerificationStatus};
pub use user::{User, UserId};
