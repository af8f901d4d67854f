//! Product Repository
//!
//! 负责商品与库存文档的持久化。库存变更统一走
//! [`ProductRepository::update_inventory`]，保持 `total_stock` 与
//! 逐项库存一致。

use std::collections::HashSet;

use chrono::Utc;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{InventoryEntry, Product, ProductCreate};

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn db(&self) -> &Surreal<Db> {
        self.base.db()
    }

    /// Parse an API-supplied product id
    pub fn record_id(id: &str) -> RepoResult<RecordId> {
        parse_record_id(TABLE, id)
    }

    /// List all active products, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .db()
            .query("SELECT * FROM type::table($table) WHERE is_active = true ORDER BY created_at DESC")
            .bind(("table", TABLE))
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Product> {
        let product: Option<Product> = self.db().select(id.clone()).await?;
        product.ok_or_else(|| RepoError::NotFound(format!("Product not found: {id}")))
    }

    /// Create a product, normalizing and validating its inventory matrix
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let product = build_product(data)?;
        let created: Option<Product> = self.db().create(TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Replace the inventory matrix and its denormalized total in one statement
    pub async fn update_inventory(
        &self,
        id: &RecordId,
        inventory: Vec<InventoryEntry>,
        total_stock: i64,
    ) -> RepoResult<Product> {
        let updated: Option<Product> = self
            .db()
            .query("UPDATE $thing SET inventory = $inventory, total_stock = $total_stock RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("inventory", inventory))
            .bind(("total_stock", total_stock))
            .await?
            .take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Product not found: {id}")))
    }
}

/// Validate a create payload and assemble the stored document.
///
/// 约束：库存项引用的颜色/尺码必须在声明轴里，(颜色, 尺码) 组合不可重复，
/// 库存不可为负。`total_stock` 由逐项求和得出，不信任客户端。
fn build_product(data: ProductCreate) -> RepoResult<Product> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("Product name is required".to_string()));
    }
    if data.price < 0.0 {
        return Err(RepoError::Validation("Price cannot be negative".to_string()));
    }

    let colors = data.colors.unwrap_or_default();
    let sizes = data.sizes.unwrap_or_default();
    let inventory = data.inventory.unwrap_or_default();

    let color_names: HashSet<&str> = colors.iter().map(|c| c.name.as_str()).collect();
    let size_names: HashSet<&str> = sizes.iter().map(|s| s.name.as_str()).collect();

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut total_stock: i64 = 0;
    for entry in &inventory {
        if !color_names.contains(entry.color.as_str()) {
            return Err(RepoError::Validation(format!(
                "Inventory references undeclared color: {}",
                entry.color
            )));
        }
        if !size_names.contains(entry.size.as_str()) {
            return Err(RepoError::Validation(format!(
                "Inventory references undeclared size: {}",
                entry.size
            )));
        }
        if entry.stock < 0 {
            return Err(RepoError::Validation(format!(
                "Stock cannot be negative for {} / {}",
                entry.color, entry.size
            )));
        }
        if !seen.insert((entry.color.as_str(), entry.size.as_str())) {
            return Err(RepoError::Duplicate(format!(
                "Duplicate inventory variant: {} / {}",
                entry.color, entry.size
            )));
        }
        total_stock += entry.stock;
    }

    Ok(Product {
        id: None,
        name: data.name,
        description: data.description.unwrap_or_default(),
        price: data.price,
        category: data.category,
        gender: data.gender.unwrap_or_default(),
        colors,
        sizes,
        inventory,
        total_stock,
        is_active: true,
        created_at: Some(Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ColorOption, SizeOption};

    fn payload() -> ProductCreate {
        ProductCreate {
            name: "Classic Scrub Top".to_string(),
            description: None,
            price: 2500.0,
            category: "scrubs".to_string(),
            gender: Some("unisex".to_string()),
            colors: Some(vec![ColorOption {
                name: "Navy".to_string(),
                code: "#1F2A44".to_string(),
                is_available: true,
            }]),
            sizes: Some(vec![
                SizeOption {
                    name: "S".to_string(),
                    is_available: true,
                },
                SizeOption {
                    name: "M".to_string(),
                    is_available: true,
                },
            ]),
            inventory: Some(vec![
                InventoryEntry {
                    color: "Navy".to_string(),
                    size: "S".to_string(),
                    stock: 3,
                },
                InventoryEntry {
                    color: "Navy".to_string(),
                    size: "M".to_string(),
                    stock: 7,
                },
            ]),
        }
    }

    #[test]
    fn test_build_product_sums_total_stock() {
        let product = build_product(payload()).unwrap();
        assert_eq!(product.total_stock, 10);
        assert!(product.is_active);
    }

    #[test]
    fn test_build_product_rejects_duplicate_variant() {
        let mut data = payload();
        data.inventory.as_mut().unwrap().push(InventoryEntry {
            color: "Navy".to_string(),
            size: "S".to_string(),
            stock: 1,
        });
        assert!(matches!(
            build_product(data),
            Err(RepoError::Duplicate(_))
        ));
    }

    #[test]
    fn test_build_product_rejects_undeclared_color() {
        let mut data = payload();
        data.inventory.as_mut().unwrap()[0].color = "Crimson".to_string();
        assert!(matches!(
            build_product(data),
            Err(RepoError::Validation(_))
        ));
    }

    #[test]
    fn test_build_product_rejects_negative_stock() {
        let mut data = payload();
        data.inventory.as_mut().unwrap()[0].stock = -1;
        assert!(matches!(
            build_product(data),
            Err(RepoError::Validation(_))
        ));
    }
}
