//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All money values are `rust_decimal::Decimal` rounded to two decimal
//! places with Banker's Rounding.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Decimal places for money values (minor currency units).
pub const MONEY_DP: u32 = 2;

/// Rounds a money amount to [`MONEY_DP`] places using Banker's Rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointNearestEven)
}

/// Returns the line total for a quantity at a unit price, rounded.
#[must_use]
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
    round_money(quantity * unit_price)
}

/// Returns the tax for a line total at a percentage rate, rounded.
#[must_use]
pub fn line_tax(line_total: Decimal, tax_percent: Decimal) -> Decimal {
    round_money(line_total * tax_percent / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_passthrough() {
        assert_eq!(round_money(dec!(100.00)), dec!(100.00));
        assert_eq!(round_money(dec!(0)), dec!(0));
    }

    #[test]
    fn test_round_money_bankers() {
        // Midpoints round to even
        assert_eq!(round_money(dec!(2.345)), dec!(2.34));
        assert_eq!(round_money(dec!(2.355)), dec!(2.36));
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(dec!(3), dec!(199.99)), dec!(599.97));
        assert_eq!(line_total(dec!(0), dec!(50)), dec!(0));
    }

    #[test]
    fn test_line_tax() {
        assert_eq!(line_tax(dec!(1000), dec!(18)), dec!(180));
        assert_eq!(line_tax(dec!(599.97), dec!(5)), dec!(30.00));
        assert_eq!(line_tax(dec!(100), dec!(0)), dec!(0));
    }
}
