//! Server State
//!
//! 进程级单例状态。所有服务在启动时初始化一次，之后每个请求
//! 克隆共享引用 (Arc 浅拷贝)。

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::inventory::ProductLocks;
use crate::notify::{NoopNotifier, Notifier, RelayNotifier};
use crate::orders::OrderService;
use crate::storage::LocalObjectStorage;

/// 服务器状态 - 持有所有服务的单例引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | 嵌入式数据库 (SurrealDB) |
/// | jwt_service | JWT 认证服务 |
/// | notifier | 邮件通知 (中继或日志) |
/// | storage | 对象存储 (本地文件系统) |
/// | product_locks | 商品库存锁注册表 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub notifier: Arc<dyn Notifier>,
    pub storage: Arc<LocalObjectStorage>,
    pub product_locks: Arc<ProductLocks>,
}

impl ServerState {
    /// 初始化所有服务 (进程启动时调用一次)
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_service = DbService::new(&config.database_dir().to_string_lossy())
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        let notifier: Arc<dyn Notifier> = match &config.mail_relay_url {
            Some(url) => Arc::new(RelayNotifier::new(url.clone())),
            None => {
                tracing::warn!("MAIL_RELAY_URL not set, email notifications will only be logged");
                Arc::new(NoopNotifier)
            }
        };

        let storage = Arc::new(LocalObjectStorage::new(
            config.uploads_dir(),
            config.public_base_url.clone(),
        ));

        Ok(Self {
            config: config.clone(),
            db: db_service.db,
            jwt_service,
            notifier,
            storage,
            product_locks: Arc::new(ProductLocks::new()),
        })
    }

    /// 订单服务 (流水线 + 状态机)，按请求构造，成本只有几个 Arc/句柄克隆
    pub fn order_service(&self) -> OrderService {
        OrderService::new(
            self.db.clone(),
            self.product_locks.clone(),
            self.notifier.clone(),
            self.config.admin_email.clone(),
        )
    }
}
