//! Ledger builder.
//!
//! Rebuilds one customer's chronological transaction history with running
//! balances from their invoices and payments. Pure function of its inputs;
//! source records are never mutated, and identical inputs always produce
//! identical output.

use rust_decimal::Decimal;

use khata_shared::types::CustomerId;

use super::error::LedgerError;
use super::normalize::{normalize_invoice, normalize_payment, NormalizedTransaction};
use super::types::{
    EntryKind, InvoiceScope, Ledger, LedgerEntry, LedgerOptions, SourceInvoice, SourcePayment,
};

/// Ledger builder for reconstructing per-customer transaction history.
pub struct LedgerBuilder;

impl LedgerBuilder {
    /// Builds the ledger for one customer.
    ///
    /// Steps:
    /// 1. Filter records to the date window and invoice scope (draft
    ///    invoices never qualify).
    /// 2. Normalize each qualifying record, rejecting any record that
    ///    belongs to a different customer (or, for invoices, none).
    /// 3. Stable-sort by date ascending; on equal dates invoices precede
    ///    payments. This tie-break is a documented convention kept for
    ///    reproducibility.
    /// 4. Walk the sequence once, annotating each entry with the
    ///    post-transaction running balance.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if any record fails the customer precondition.
    /// Nothing partial is returned on error.
    pub fn build(
        customer_id: CustomerId,
        invoices: &[SourceInvoice],
        payments: &[SourcePayment],
        options: &LedgerOptions,
    ) -> Result<Ledger, LedgerError> {
        let mut transactions =
            Vec::with_capacity(invoices.len().saturating_add(payments.len()));

        for invoice in invoices {
            if !Self::invoice_qualifies(invoice, options) {
                continue;
            }
            let txn = normalize_invoice(invoice)?;
            Self::check_owner(customer_id, invoice.customer_id)?;
            transactions.push(txn);
        }

        for payment in payments {
            if !Self::in_window(payment.date, options) {
                continue;
            }
            if payment.customer_id != customer_id {
                return Err(LedgerError::CustomerMismatch {
                    expected: customer_id,
                    found: payment.customer_id,
                });
            }
            transactions.push(normalize_payment(payment));
        }

        // Stable sort: equal keys keep their relative input order, so the
        // output order is total and reproducible even with many entries on
        // one date.
        transactions.sort_by_key(|txn| (txn.date, txn.kind.tie_break_rank()));

        let mut running_balance = options.opening_balance;
        let entries = transactions
            .into_iter()
            .map(|txn| {
                running_balance += txn.signed_amount;
                Self::entry(txn, running_balance)
            })
            .collect();

        Ok(Ledger {
            entries,
            opening_balance: options.opening_balance,
            closing_balance: running_balance,
        })
    }

    fn invoice_qualifies(invoice: &SourceInvoice, options: &LedgerOptions) -> bool {
        if !invoice.status.has_financial_effect() {
            return false;
        }
        if !Self::in_window(invoice.date, options) {
            return false;
        }
        match options.scope {
            InvoiceScope::All => true,
            InvoiceScope::OutstandingOnly => {
                invoice.outstanding() > Decimal::ZERO
                    || invoice.status == crate::invoice::InvoiceStatus::Paid
            }
        }
    }

    fn in_window(date: chrono::NaiveDate, options: &LedgerOptions) -> bool {
        if options.date_from.is_some_and(|from| date < from) {
            return false;
        }
        if options.date_to.is_some_and(|to| date > to) {
            return false;
        }
        true
    }

    fn check_owner(
        expected: CustomerId,
        found: Option<CustomerId>,
    ) -> Result<(), LedgerError> {
        match found {
            Some(found) if found != expected => {
                Err(LedgerError::CustomerMismatch { expected, found })
            }
            // None is already rejected by the normalizer.
            _ => Ok(()),
        }
    }

    fn entry(txn: NormalizedTransaction, balance: Decimal) -> LedgerEntry {
        let amount = txn.amount();
        let (debit, credit) = match txn.kind {
            EntryKind::Invoice => (amount, Decimal::ZERO),
            EntryKind::Payment => (Decimal::ZERO, amount),
        };

        LedgerEntry {
            id: txn.id,
            date: txn.date,
            kind: txn.kind,
            description: txn.description,
            reference: txn.reference,
            debit,
            credit,
            balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceStatus;
    use crate::payment::PaymentMethod;
    use chrono::NaiveDate;
    use khata_shared::types::{InvoiceId, PaymentId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(
        customer_id: CustomerId,
        no: &str,
        on: NaiveDate,
        total: Decimal,
        allocated: Decimal,
        status: InvoiceStatus,
    ) -> SourceInvoice {
        SourceInvoice {
            id: InvoiceId::new(),
            customer_id: Some(customer_id),
            invoice_no: no.to_string(),
            date: on,
            status,
            total,
            allocated,
        }
    }

    fn payment(customer_id: CustomerId, on: NaiveDate, amount: Decimal) -> SourcePayment {
        SourcePayment {
            id: PaymentId::new(),
            customer_id,
            amount,
            method: PaymentMethod::Cash,
            date: on,
            reference: None,
        }
    }

    #[test]
    fn test_empty_inputs_yield_empty_ledger() {
        let customer = CustomerId::new();
        let ledger =
            LedgerBuilder::build(customer, &[], &[], &LedgerOptions::default()).unwrap();
        assert!(ledger.entries.is_empty());
        assert_eq!(ledger.opening_balance, dec!(0));
        assert_eq!(ledger.closing_balance, dec!(0));
    }

    #[test]
    fn test_empty_inputs_keep_opening_balance() {
        let customer = CustomerId::new();
        let options = LedgerOptions {
            opening_balance: dec!(150),
            ..Default::default()
        };
        let ledger = LedgerBuilder::build(customer, &[], &[], &options).unwrap();
        assert_eq!(ledger.closing_balance, dec!(150));
    }

    #[test]
    fn test_invoice_then_payment_scenario() {
        // Invoice A total 1000 on Jan 1, payment 600 on Jan 5 with no
        // allocations: entries [1000 @ 1000, 600 @ 400], closing 400.
        let customer = CustomerId::new();
        let invoices = [invoice(
            customer,
            "INV-20240101-0001",
            date(2024, 1, 1),
            dec!(1000),
            dec!(0),
            InvoiceStatus::Unpaid,
        )];
        let payments = [payment(customer, date(2024, 1, 5), dec!(600))];

        let ledger =
            LedgerBuilder::build(customer, &invoices, &payments, &LedgerOptions::default())
                .unwrap();

        assert_eq!(ledger.entries.len(), 2);
        assert_eq!(ledger.entries[0].kind, EntryKind::Invoice);
        assert_eq!(ledger.entries[0].debit, dec!(1000));
        assert_eq!(ledger.entries[0].credit, dec!(0));
        assert_eq!(ledger.entries[0].balance, dec!(1000));
        assert_eq!(ledger.entries[1].kind, EntryKind::Payment);
        assert_eq!(ledger.entries[1].credit, dec!(600));
        assert_eq!(ledger.entries[1].balance, dec!(400));
        assert_eq!(ledger.closing_balance, dec!(400));
    }

    #[test]
    fn test_payment_only_customer_goes_negative() {
        // Business owes the customer; valid state, not an error.
        let customer = CustomerId::new();
        let payments = [payment(customer, date(2024, 2, 1), dec!(200))];

        let ledger =
            LedgerBuilder::build(customer, &[], &payments, &LedgerOptions::default()).unwrap();

        assert_eq!(ledger.entries.len(), 1);
        assert_eq!(ledger.closing_balance, dec!(-200));
    }

    #[test]
    fn test_same_date_invoice_precedes_payment() {
        let customer = CustomerId::new();
        let on = date(2024, 3, 10);
        let invoices = [invoice(
            customer,
            "INV-20240310-0001",
            on,
            dec!(500),
            dec!(0),
            InvoiceStatus::Unpaid,
        )];
        let payments = [payment(customer, on, dec!(500))];

        // Input order payments-first must not matter.
        let ledger =
            LedgerBuilder::build(customer, &invoices, &payments, &LedgerOptions::default())
                .unwrap();

        assert_eq!(ledger.entries[0].kind, EntryKind::Invoice);
        assert_eq!(ledger.entries[0].balance, dec!(500));
        assert_eq!(ledger.entries[1].kind, EntryKind::Payment);
        assert_eq!(ledger.entries[1].balance, dec!(0));
    }

    #[test]
    fn test_draft_invoices_are_excluded() {
        let customer = CustomerId::new();
        let invoices = [invoice(
            customer,
            "INV-20240401-0001",
            date(2024, 4, 1),
            dec!(900),
            dec!(0),
            InvoiceStatus::Draft,
        )];

        let ledger =
            LedgerBuilder::build(customer, &invoices, &[], &LedgerOptions::default()).unwrap();
        assert!(ledger.entries.is_empty());
        assert_eq!(ledger.closing_balance, dec!(0));
    }

    #[test]
    fn test_date_window_filters_both_sides() {
        let customer = CustomerId::new();
        let invoices = [
            invoice(
                customer,
                "INV-1",
                date(2024, 1, 1),
                dec!(100),
                dec!(0),
                InvoiceStatus::Unpaid,
            ),
            invoice(
                customer,
                "INV-2",
                date(2024, 6, 1),
                dec!(200),
                dec!(0),
                InvoiceStatus::Unpaid,
            ),
        ];
        let payments = [
            payment(customer, date(2024, 1, 2), dec!(50)),
            payment(customer, date(2024, 6, 2), dec!(60)),
        ];
        let options = LedgerOptions {
            date_from: Some(date(2024, 5, 1)),
            date_to: Some(date(2024, 6, 30)),
            ..Default::default()
        };

        let ledger = LedgerBuilder::build(customer, &invoices, &payments, &options).unwrap();

        assert_eq!(ledger.entries.len(), 2);
        assert_eq!(ledger.entries[0].debit, dec!(200));
        assert_eq!(ledger.entries[1].credit, dec!(60));
        assert_eq!(ledger.closing_balance, dec!(140));
    }

    #[test]
    fn test_outstanding_only_scope_drops_settled_zero_total() {
        let customer = CustomerId::new();
        let invoices = [
            // Still owed: kept.
            invoice(
                customer,
                "INV-1",
                date(2024, 1, 1),
                dec!(1000),
                dec!(400),
                InvoiceStatus::Partial,
            ),
            // Fully settled: kept (it explains past payments).
            invoice(
                customer,
                "INV-2",
                date(2024, 1, 2),
                dec!(300),
                dec!(300),
                InvoiceStatus::Paid,
            ),
            // No financial effect: dropped.
            invoice(
                customer,
                "INV-3",
                date(2024, 1, 3),
                dec!(0),
                dec!(0),
                InvoiceStatus::Unpaid,
            ),
        ];
        let options = LedgerOptions {
            scope: InvoiceScope::OutstandingOnly,
            ..Default::default()
        };

        let ledger = LedgerBuilder::build(customer, &invoices, &[], &options).unwrap();
        assert_eq!(ledger.entries.len(), 2);
    }

    #[test]
    fn test_rejects_record_for_other_customer() {
        let customer = CustomerId::new();
        let other = CustomerId::new();
        let invoices = [invoice(
            other,
            "INV-1",
            date(2024, 1, 1),
            dec!(100),
            dec!(0),
            InvoiceStatus::Unpaid,
        )];

        let result =
            LedgerBuilder::build(customer, &invoices, &[], &LedgerOptions::default());
        assert!(matches!(
            result,
            Err(LedgerError::CustomerMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_payment_for_other_customer() {
        let customer = CustomerId::new();
        let other = CustomerId::new();
        let payments = [payment(other, date(2024, 1, 1), dec!(100))];

        let result =
            LedgerBuilder::build(customer, &[], &payments, &LedgerOptions::default());
        assert!(matches!(
            result,
            Err(LedgerError::CustomerMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_invoice_without_customer_before_computing() {
        let customer = CustomerId::new();
        let mut bad = invoice(
            customer,
            "INV-1",
            date(2024, 1, 1),
            dec!(100),
            dec!(0),
            InvoiceStatus::Unpaid,
        );
        bad.customer_id = None;
        let good = invoice(
            customer,
            "INV-2",
            date(2024, 1, 2),
            dec!(100),
            dec!(0),
            InvoiceStatus::Unpaid,
        );

        // No partial ledger comes back.
        let result =
            LedgerBuilder::build(customer, &[bad, good], &[], &LedgerOptions::default());
        assert!(matches!(
            result,
            Err(LedgerError::InvoiceWithoutCustomer(_))
        ));
    }

    #[test]
    fn test_opening_balance_offsets_running_balance() {
        let customer = CustomerId::new();
        let invoices = [invoice(
            customer,
            "INV-1",
            date(2024, 1, 1),
            dec!(100),
            dec!(0),
            InvoiceStatus::Unpaid,
        )];
        let options = LedgerOptions {
            opening_balance: dec!(-50),
            ..Default::default()
        };

        let ledger = LedgerBuilder::build(customer, &invoices, &[], &options).unwrap();
        assert_eq!(ledger.entries[0].balance, dec!(50));
        assert_eq!(ledger.closing_balance, dec!(50));
    }
}
