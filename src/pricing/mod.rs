//! Pricing Module
//!
//! 金额一律先转 [`rust_decimal::Decimal`] 再计算，输出时四舍五入
//! 到两位小数，避免 f64 累加误差进入订单。

pub mod discount;
pub mod money;

pub use discount::{DiscountBreakdown, DiscountProfile, compute_discount};
pub use money::{round_money, to_decimal, to_f64};
