//! Invoice totals recomputed from line items.

use khata_shared::types::money::{line_tax, line_total, round_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single invoice line item as the totals computation sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Tax rate as a percentage (e.g., 18 for 18% GST).
    pub tax_percent: Decimal,
}

impl LineItem {
    /// Line total = quantity × unit price.
    #[must_use]
    pub fn total(&self) -> Decimal {
        line_total(self.quantity, self.unit_price)
    }

    /// Line tax = line total × tax percent / 100.
    #[must_use]
    pub fn tax(&self) -> Decimal {
        line_tax(self.total(), self.tax_percent)
    }
}

/// Invoice money totals.
///
/// Invariant: `total = subtotal + tax - discount`. Totals are always
/// recomputed from the full current item set so that last-write-wins
/// updates cannot corrupt them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Sum of line taxes.
    pub tax: Decimal,
    /// Invoice-level discount.
    pub discount: Decimal,
    /// Amount the customer owes for this invoice.
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Recomputes totals from the full current item set.
    #[must_use]
    pub fn from_items(items: &[LineItem], discount: Decimal) -> Self {
        let subtotal: Decimal = items.iter().map(LineItem::total).sum();
        let tax: Decimal = items.iter().map(LineItem::tax).sum();
        let discount = round_money(discount);

        Self {
            subtotal,
            tax,
            discount,
            total: subtotal + tax - discount,
        }
    }

    /// Totals for a lump-sum ("without bill") invoice with no items.
    #[must_use]
    pub fn lump_sum(amount: Decimal) -> Self {
        let amount = round_money(amount);
        Self {
            subtotal: amount,
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: Decimal, unit_price: Decimal, tax_percent: Decimal) -> LineItem {
        LineItem {
            quantity,
            unit_price,
            tax_percent,
        }
    }

    #[test]
    fn test_empty_items() {
        let totals = InvoiceTotals::from_items(&[], Decimal::ZERO);
        assert_eq!(totals.subtotal, dec!(0));
        assert_eq!(totals.tax, dec!(0));
        assert_eq!(totals.total, dec!(0));
    }

    #[test]
    fn test_single_item_no_tax() {
        let totals = InvoiceTotals::from_items(&[item(dec!(2), dec!(250), dec!(0))], dec!(0));
        assert_eq!(totals.subtotal, dec!(500));
        assert_eq!(totals.tax, dec!(0));
        assert_eq!(totals.total, dec!(500));
    }

    #[test]
    fn test_items_with_tax_and_discount() {
        let items = [
            item(dec!(3), dec!(199.99), dec!(5)),
            item(dec!(1), dec!(400.03), dec!(18)),
        ];
        let totals = InvoiceTotals::from_items(&items, dec!(50));

        assert_eq!(totals.subtotal, dec!(1000.00));
        // 599.97 * 5% = 30.00 (banker's), 400.03 * 18% = 72.01
        assert_eq!(totals.tax, dec!(102.01));
        assert_eq!(totals.discount, dec!(50));
        assert_eq!(totals.total, totals.subtotal + totals.tax - totals.discount);
    }

    #[test]
    fn test_total_invariant_holds() {
        let items = [
            item(dec!(7), dec!(13.37), dec!(12)),
            item(dec!(2.5), dec!(99.90), dec!(18)),
        ];
        let totals = InvoiceTotals::from_items(&items, dec!(10.55));
        assert_eq!(totals.total, totals.subtotal + totals.tax - totals.discount);
    }

    #[test]
    fn test_lump_sum() {
        let totals = InvoiceTotals::lump_sum(dec!(1200));
        assert_eq!(totals.subtotal, dec!(1200));
        assert_eq!(totals.tax, dec!(0));
        assert_eq!(totals.discount, dec!(0));
        assert_eq!(totals.total, dec!(1200));
    }
}
