//! Balance aggregation.
//!
//! Computes a single outstanding-balance figure per customer without
//! materializing the full ledger, for list and summary views. The shortcut
//! is required to agree exactly with the ledger builder's closing balance
//! over an unbounded window; divergence is a defect, never a runtime
//! condition to recover from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use khata_shared::types::CustomerId;

use super::error::LedgerError;
use super::types::{Ledger, SourceInvoice, SourcePayment};

/// A customer's aggregate balance for list views.
///
/// Positive = customer owes the business, negative = business owes the
/// customer, zero = settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerBalance {
    /// Customer ID.
    pub customer_id: CustomerId,
    /// Human-readable customer code.
    pub customer_code: String,
    /// Customer display name.
    pub customer_name: String,
    /// Net outstanding balance.
    pub balance: Decimal,
}

/// Balance aggregator.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Aggregate shortcut: sum of non-draft invoice totals minus sum of
    /// payment amounts.
    ///
    /// Draft invoices are skipped with exactly the same rule the ledger
    /// builder applies, which is what keeps this shortcut numerically
    /// identical to the itemized closing balance.
    #[must_use]
    pub fn aggregate(invoices: &[SourceInvoice], payments: &[SourcePayment]) -> Decimal {
        let invoiced: Decimal = invoices
            .iter()
            .filter(|invoice| invoice.status.has_financial_effect())
            .map(|invoice| invoice.total)
            .sum();
        let paid: Decimal = payments.iter().map(|payment| payment.amount).sum();

        invoiced - paid
    }

    /// Cross-checks the aggregate shortcut against an itemized ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BalanceMismatch`] if the two disagree.
    pub fn verify(aggregate: Decimal, ledger: &Ledger) -> Result<(), LedgerError> {
        if aggregate == ledger.closing_balance {
            Ok(())
        } else {
            Err(LedgerError::BalanceMismatch {
                aggregate,
                itemized: ledger.closing_balance,
            })
        }
    }
}

/// Prepares a balance sweep for display: drops settled customers and sorts
/// by balance magnitude descending.
#[must_use]
pub fn rank_balances(mut balances: Vec<CustomerBalance>) -> Vec<CustomerBalance> {
    balances.retain(|balance| balance.balance != Decimal::ZERO);
    balances.sort_by(|a, b| b.balance.abs().cmp(&a.balance.abs()));
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceStatus;
    use crate::ledger::builder::LedgerBuilder;
    use crate::ledger::types::LedgerOptions;
    use crate::payment::PaymentMethod;
    use chrono::NaiveDate;
    use khata_shared::types::{InvoiceId, PaymentId};
    use rust_decimal_macros::dec;

    fn invoice(
        customer_id: CustomerId,
        total: Decimal,
        status: InvoiceStatus,
    ) -> SourceInvoice {
        SourceInvoice {
            id: InvoiceId::new(),
            customer_id: Some(customer_id),
            invoice_no: "INV-20240101-0001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status,
            total,
            allocated: dec!(0),
        }
    }

    fn payment(customer_id: CustomerId, amount: Decimal) -> SourcePayment {
        SourcePayment {
            id: PaymentId::new(),
            customer_id,
            amount,
            method: PaymentMethod::Cash,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            reference: None,
        }
    }

    fn balance(name: &str, amount: Decimal) -> CustomerBalance {
        CustomerBalance {
            customer_id: CustomerId::new(),
            customer_code: format!("CUST-{name}"),
            customer_name: name.to_string(),
            balance: amount,
        }
    }

    #[test]
    fn test_aggregate_invoices_minus_payments() {
        let customer = CustomerId::new();
        let invoices = [
            invoice(customer, dec!(1000), InvoiceStatus::Unpaid),
            invoice(customer, dec!(250), InvoiceStatus::Paid),
        ];
        let payments = [payment(customer, dec!(600))];

        assert_eq!(
            BalanceAggregator::aggregate(&invoices, &payments),
            dec!(650)
        );
    }

    #[test]
    fn test_aggregate_skips_drafts() {
        let customer = CustomerId::new();
        let invoices = [
            invoice(customer, dec!(1000), InvoiceStatus::Unpaid),
            invoice(customer, dec!(9999), InvoiceStatus::Draft),
        ];

        assert_eq!(BalanceAggregator::aggregate(&invoices, &[]), dec!(1000));
    }

    #[test]
    fn test_aggregate_matches_ledger_closing_balance() {
        let customer = CustomerId::new();
        let invoices = [
            invoice(customer, dec!(1000), InvoiceStatus::Partial),
            invoice(customer, dec!(350.50), InvoiceStatus::Unpaid),
            invoice(customer, dec!(42), InvoiceStatus::Draft),
        ];
        let payments = [payment(customer, dec!(600)), payment(customer, dec!(99.25))];

        let ledger =
            LedgerBuilder::build(customer, &invoices, &payments, &LedgerOptions::default())
                .unwrap();
        let aggregate = BalanceAggregator::aggregate(&invoices, &payments);

        assert_eq!(aggregate, ledger.closing_balance);
        assert!(BalanceAggregator::verify(aggregate, &ledger).is_ok());
    }

    #[test]
    fn test_verify_flags_divergence() {
        let customer = CustomerId::new();
        let ledger =
            LedgerBuilder::build(customer, &[], &[], &LedgerOptions::default()).unwrap();

        let result = BalanceAggregator::verify(dec!(1), &ledger);
        assert!(matches!(result, Err(LedgerError::BalanceMismatch { .. })));
    }

    #[test]
    fn test_rank_drops_zero_and_sorts_by_magnitude() {
        let ranked = rank_balances(vec![
            balance("a", dec!(100)),
            balance("b", dec!(0)),
            balance("c", dec!(-500)),
            balance("d", dec!(250)),
        ]);

        let names: Vec<&str> = ranked.iter().map(|b| b.customer_name.as_str()).collect();
        assert_eq!(names, vec!["c", "d", "a"]);
    }
}
