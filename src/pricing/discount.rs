//! Discount Engine
//!
//! 折扣叠加顺序：先按小计算百分比折扣 (首单 10%、学生 5%，可叠加)，
//! 再抵扣积分 (1 积分 = 1 货币单位)，积分用量封顶到剩余应付额。
//! 最终 `total` 不会为负，`points_earned = floor(total / 100)`。

use rust_decimal::prelude::*;

use super::money::{round_money, to_decimal, to_f64};

const FIRST_ORDER_PERCENT: i64 = 10;
const STUDENT_PERCENT: i64 = 5;

/// Which percentage discounts the buyer qualifies for
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountProfile {
    pub is_first_order: bool,
    pub is_verified_student: bool,
}

/// Result of one pricing computation
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountBreakdown {
    pub subtotal: f64,
    pub discount_amount: f64,
    /// Reasons joined with " + ", empty when nothing applied
    pub discount_reason: String,
    /// Points actually consumed after capping
    pub points_used: i64,
    pub points_earned: i64,
    pub total: f64,
}

/// Compute discounts, points usage and the final total for one order.
///
/// `points_to_use` 应已被调用方按用户余额截断，这里只再按剩余
/// 应付额截断一次。
pub fn compute_discount(
    subtotal: f64,
    points_to_use: i64,
    profile: DiscountProfile,
) -> DiscountBreakdown {
    let subtotal_dec = round_money(to_decimal(subtotal));

    let mut percent: i64 = 0;
    let mut reasons: Vec<String> = Vec::new();
    if profile.is_first_order {
        percent += FIRST_ORDER_PERCENT;
        reasons.push(format!("First Order Discount ({FIRST_ORDER_PERCENT}%)"));
    }
    if profile.is_verified_student {
        percent += STUDENT_PERCENT;
        reasons.push(format!("Student Discount ({STUDENT_PERCENT}%)"));
    }

    let discount = round_money(subtotal_dec * Decimal::new(percent, 2));
    let after_discount = (subtotal_dec - discount).max(Decimal::ZERO);

    // 积分面值 1:1，不能把总额抵成负数；积分不进入折扣原因串
    let points_cap = after_discount.trunc().to_i64().unwrap_or(0);
    let points_used = points_to_use.clamp(0, points_cap);

    let total = (after_discount - Decimal::from(points_used)).max(Decimal::ZERO);
    let points_earned = points_earned_for(&total);

    DiscountBreakdown {
        subtotal: to_f64(subtotal_dec),
        discount_amount: to_f64(discount),
        discount_reason: reasons.join(" + "),
        points_used,
        points_earned,
        total: to_f64(total),
    }
}

/// 1 point per full 100 of final total
fn points_earned_for(total: &Decimal) -> i64 {
    (total / Decimal::from(100)).trunc().to_i64().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_discounts() {
        let b = compute_discount(1000.0, 0, DiscountProfile::default());
        assert_eq!(b.discount_amount, 0.0);
        assert_eq!(b.discount_reason, "");
        assert_eq!(b.total, 1000.0);
        assert_eq!(b.points_earned, 10);
    }

    #[test]
    fn test_first_order_discount() {
        let b = compute_discount(
            1000.0,
            0,
            DiscountProfile {
                is_first_order: true,
                is_verified_student: false,
            },
        );
        assert_eq!(b.discount_amount, 100.0);
        assert_eq!(b.discount_reason, "First Order Discount (10%)");
        assert_eq!(b.total, 900.0);
        assert_eq!(b.points_earned, 9);
    }

    #[test]
    fn test_stacked_discounts_and_reason_order() {
        let b = compute_discount(
            2000.0,
            0,
            DiscountProfile {
                is_first_order: true,
                is_verified_student: true,
            },
        );
        // 10% + 5% on the subtotal
        assert_eq!(b.discount_amount, 300.0);
        assert_eq!(
            b.discount_reason,
            "First Order Discount (10%) + Student Discount (5%)"
        );
        assert_eq!(b.total, 1700.0);
        assert_eq!(b.points_earned, 17);
    }

    #[test]
    fn test_points_capped_at_remaining_total() {
        let b = compute_discount(
            500.0,
            10_000,
            DiscountProfile {
                is_first_order: true,
                is_verified_student: false,
            },
        );
        assert_eq!(b.discount_amount, 50.0);
        assert_eq!(b.points_used, 450);
        assert_eq!(b.total, 0.0);
        assert_eq!(b.points_earned, 0);
    }

    #[test]
    fn test_negative_points_request_ignored() {
        let b = compute_discount(300.0, -50, DiscountProfile::default());
        assert_eq!(b.points_used, 0);
        assert_eq!(b.total, 300.0);
    }

    #[test]
    fn test_points_do_not_change_reason_string() {
        let b = compute_discount(
            1000.0,
            100,
            DiscountProfile {
                is_first_order: true,
                is_verified_student: true,
            },
        );
        assert_eq!(b.points_used, 100);
        assert_eq!(
            b.discount_reason,
            "First Order Discount (10%) + Student Discount (5%)"
        );
        assert_eq!(b.total, 750.0);
        assert_eq!(b.points_earned, 7);
    }

    #[test]
    fn test_rounding_on_odd_subtotal() {
        let b = compute_discount(
            999.99,
            0,
            DiscountProfile {
                is_first_order: true,
                is_verified_student: false,
            },
        );
        // 10% of 999.99 = 99.999 → 100.00
        assert_eq!(b.discount_amount, 100.0);
        assert_eq!(b.total, 899.99);
    }
}
