//! Storefront Server - 电商后端服务
//!
//! # 架构概述
//!
//! - **商品与库存** (`inventory`): 按 (颜色, 尺码) 逐项计数的库存账本
//! - **定价** (`pricing`): 首单/学生折扣叠加 + 积分抵扣
//! - **积分** (`loyalty`): 下单结算、取消冲正
//! - **订单** (`orders`): 下单流水线 (带补偿) 与状态机
//! - **通知** (`notify`): 邮件中继，发送不阻塞业务
//! - **存储** (`storage`): 回执/图片对象存储
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # JWT 认证、提取器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (模型 + 仓库)
//! ├── inventory/     # 库存账本与商品锁
//! ├── pricing/       # 折扣引擎
//! ├── loyalty/       # 积分账本
//! ├── orders/        # 下单流水线、状态机
//! ├── notify/        # 邮件通知
//! ├── storage/       # 对象存储
//! └── utils/         # 错误、日志等工具
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod inventory;
pub mod loyalty;
pub mod notify;
pub mod orders;
pub mod pricing;
pub mod storage;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::OrderService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   _____ __                  ____                 __
  / ___// /_____  ________  / __/________  ____  / /_
  \__ \/ __/ __ \/ ___/ _ \/ /_/ ___/ __ \/ __ \/ __/
 ___/ / /_/ /_/ / /  /  __/ __/ /  / /_/ / / / / /_
/____/\__/\____/_/   \___/_/ /_/   \____/_/ /_/\__/
    "#
    );
}

/// 设置运行环境：加载 .env、初始化日志
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    if config.is_production() {
        config.ensure_work_dir_structure()?;
        let log_dir = config.logs_dir();
        init_logger_with_file(
            std::env::var("LOG_LEVEL").ok().as_deref(),
            log_dir.to_str(),
        );
    } else {
        init_logger_with_file(std::env::var("LOG_LEVEL").ok().as_deref(), None);
    }

    Ok(())
}
