//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品与库存接口
//! - [`orders`] - 订单接口 (下单、取消、状态、折扣预览)
//! - [`student_verifications`] - 学生认证接口
//! - [`hero_images`] - 促销横幅接口

pub mod health;

// Data models API
pub mod hero_images;
pub mod orders;
pub mod products;
pub mod student_verifications;

use crate::auth::CurrentUser;
use crate::utils::{AppError, AppResult};

/// 管理员角色检查 (角色在 JWT claims 里)
pub fn require_admin(user: &CurrentUser) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}
