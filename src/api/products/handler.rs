//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::require_admin;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, VariantStockUpdate};
use crate::db::repository::ProductRepository;
use crate::utils::{AppError, AppResult};

/// GET /api/products - 获取所有在售商品
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_all().await?;
    Ok(Json(products))
}

/// GET /api/products/:id - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let record_id = ProductRepository::record_id(&id)?;
    let product = repo.find_by_id(&record_id).await?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品 (管理员)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    require_admin(&user)?;
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(payload).await?;
    tracing::info!(
        "Product created: {} ({})",
        product.name,
        product.id.as_ref().map(|i| i.to_string()).unwrap_or_default()
    );
    Ok(Json(product))
}

/// POST /api/products/:id/inventory - 设置单个变体库存 (管理员)
///
/// 变体不存在时创建，存在时覆盖。(颜色, 尺码) 必须在商品声明的轴里。
pub async fn set_variant_stock(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<VariantStockUpdate>,
) -> AppResult<Json<Product>> {
    require_admin(&user)?;
    if payload.stock < 0 {
        return Err(AppError::Validation("Stock cannot be negative".to_string()));
    }

    let repo = ProductRepository::new(state.db.clone());
    let record_id = ProductRepository::record_id(&id)?;

    // 与下单流水线共用同一把商品锁，避免覆盖正在进行的预留
    let lock = state.product_locks.lock_for(&record_id.to_string());
    let _guard = lock.lock().await;

    let mut product = repo.find_by_id(&record_id).await?;
    if !product.colors.iter().any(|c| c.name == payload.color) {
        return Err(AppError::Validation(format!(
            "Undeclared color: {}",
            payload.color
        )));
    }
    if !product.sizes.iter().any(|s| s.name == payload.size) {
        return Err(AppError::Validation(format!(
            "Undeclared size: {}",
            payload.size
        )));
    }

    product.set_variant_stock(&payload.color, &payload.size, payload.stock);
    let total = product.total_stock;
    let inventory = product.inventory.clone();
    let updated = repo.update_inventory(&record_id, inventory, total).await?;
    Ok(Json(updated))
}

/// GET /api/products/fix-product/:id - 重算冗余总库存 (修复漂移)
pub async fn fix_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let record_id = ProductRepository::record_id(&id)?;

    let lock = state.product_locks.lock_for(&record_id.to_string());
    let _guard = lock.lock().await;

    let mut product = repo.find_by_id(&record_id).await?;
    let before = product.total_stock;
    let total = product.recalculate_total_stock();
    if total != before {
        tracing::warn!("total_stock drift repaired for {record_id}: {before} -> {total}");
    }
    let inventory = product.inventory.clone();
    let updated = repo.update_inventory(&record_id, inventory, total).await?;
    Ok(Json(updated))
}
