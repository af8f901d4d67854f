//! 认证模块
//!
//! 只负责校验已签发的 JWT (签发由外部账号服务完成)：
//! - [`JwtService`] - HS256 令牌校验
//! - [`CurrentUser`] - 必须登录的提取器
//! - [`OptionalUser`] - 允许游客的提取器

mod extractor;
mod jwt;

pub use extractor::OptionalUser;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
