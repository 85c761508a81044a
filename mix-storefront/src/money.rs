//! Money arithmetic
//!
//! Prices live as `f64` in the stored models; every calculation runs
//! through `Decimal` and is rounded to 2 decimal places, half-up,
//! before converting back.

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

pub fn round2(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Unit price times quantity, rounded
pub fn line_total(unit_price: f64, quantity: i64) -> f64 {
    round2(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Sum of already-rounded amounts, rounded again for safety
pub fn sum(amounts: impl IntoIterator<Item = f64>) -> f64 {
    round2(amounts.into_iter().map(to_decimal).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_avoids_float_drift() {
        // 0.1 * 3 in plain f64 is 0.30000000000000004
        assert_eq!(line_total(0.1, 3), 0.3);
        assert_eq!(line_total(19.99, 7), 139.93);
    }

    #[test]
    fn test_half_up_rounding() {
        assert_eq!(round2(to_decimal(2.345)), 2.35);
        assert_eq!(round2(to_decimal(2.344)), 2.34);
    }

    #[test]
    fn test_sum() {
        assert_eq!(sum([10.10, 20.20, 0.05]), 30.35);
    }
}
