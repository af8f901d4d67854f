//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

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
pub use hero_image::HeroImageRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use student_verification::StudentVerificationRepository;
pub use user::UserRepository;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "product:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("product", "abc");
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Parse an API-supplied id ("table:key" or bare key) into a RecordId
pub fn parse_record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    if let Some(key) = id.strip_prefix(&format!("{table}:")) {
        Ok(RecordId::from_table_key(table, key))
    } else if id.contains(':') {
        id.parse()
            .map_err(|_| RepoError::Validation(format!("Invalid id: {id}")))
    } else {
        Ok(RecordId::from_table_key(table, id))
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
