//! Money Conversion Helpers

use rust_decimal::prelude::*;

/// Convert an API-facing f64 amount into a Decimal
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Round to 2 decimal places, midpoint away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert back to f64 for storage / JSON, rounded to 2 decimal places
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_midpoint_away_from_zero() {
        assert_eq!(round_money(Decimal::new(2345, 3)), Decimal::new(235, 2));
        assert_eq!(round_money(Decimal::new(2344, 3)), Decimal::new(234, 2));
    }

    #[test]
    fn test_f64_round_trip() {
        let d = to_decimal(2499.99);
        assert_eq!(to_f64(d), 2499.99);
    }
}
