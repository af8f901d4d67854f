//! Product Model
//!
//! 库存按 (颜色, 尺码) 组合逐项计数，`total_stock` 为冗余总和。
//! 创建时强制 (颜色, 尺码) 组合唯一，库存操作见 [`crate::inventory`]。

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type ProductId = RecordId;

/// Declared color axis entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorOption {
    pub name: String,
    /// Hex code for display (e.g. "#B3252C")
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// Declared size axis entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeOption {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// Per-variant stock counter — the authoritative inventory record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub color: String,
    pub size: String,
    #[serde(default)]
    pub stock: i64,
}

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub colors: Vec<ColorOption>,
    #[serde(default)]
    pub sizes: Vec<SizeOption>,
    /// Per-variant counters; (color, size) unique by construction
    #[serde(default)]
    pub inventory: Vec<InventoryEntry>,
    /// Denormalized sum of all `inventory[].stock`
    #[serde(default)]
    pub total_stock: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub gender: Option<String>,
    pub colors: Option<Vec<ColorOption>>,
    pub sizes: Option<Vec<SizeOption>>,
    pub inventory: Option<Vec<InventoryEntry>>,
}

/// Set/replace one variant's stock (admin inventory endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantStockUpdate {
    pub color: String,
    pub size: String,
    pub stock: i64,
}
