//! 服务器级错误
//!
//! 启动/运行阶段的致命错误，区别于请求级 [`crate::AppError`]

use thiserror::Error;

/// 服务器启动和运行错误
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database initialization failed: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// 服务器级 Result
pub type Result<T> = std::result::Result<T, ServerError>;
