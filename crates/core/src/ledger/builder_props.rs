//! Property-based tests for the ledger builder and balance aggregator.
//!
//! Covered properties:
//! - Idempotence: identical inputs always rebuild the identical ledger
//! - Tie-break determinism: invoices precede payments on equal dates
//!   regardless of input order
//! - Ledger/balance equivalence: the aggregate shortcut equals the
//!   itemized closing balance
//! - Conservation: closing balance = opening + sum of signed amounts

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use khata_shared::types::{CustomerId, InvoiceId, PaymentId};

use super::balance::BalanceAggregator;
use super::builder::LedgerBuilder;
use super::types::{EntryKind, LedgerOptions, SourceInvoice, SourcePayment};
use crate::invoice::InvoiceStatus;
use crate::payment::PaymentMethod;

/// Strategy to generate positive money amounts (0.01 to 100,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

/// Strategy to generate dates within one year.
fn business_date() -> impl Strategy<Value = NaiveDate> {
    (0u32..365u32).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .checked_add_days(chrono::Days::new(u64::from(offset)))
            .unwrap()
    })
}

fn non_draft_status() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Unpaid),
        Just(InvoiceStatus::Partial),
        Just(InvoiceStatus::Paid),
    ]
}

fn payment_method() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::Card),
        Just(PaymentMethod::Upi),
        Just(PaymentMethod::BankTransfer),
        Just(PaymentMethod::Cheque),
    ]
}

fn invoice_for(customer: CustomerId) -> impl Strategy<Value = SourceInvoice> {
    (positive_amount(), business_date(), non_draft_status()).prop_map(
        move |(total, date, status)| SourceInvoice {
            id: InvoiceId::new(),
            customer_id: Some(customer),
            invoice_no: format!("INV-{}-0001", date.format("%Y%m%d")),
            date,
            status,
            total,
            allocated: Decimal::ZERO,
        },
    )
}

fn payment_for(customer: CustomerId) -> impl Strategy<Value = SourcePayment> {
    (positive_amount(), business_date(), payment_method()).prop_map(
        move |(amount, date, method)| SourcePayment {
            id: PaymentId::new(),
            customer_id: customer,
            amount,
            method,
            date,
            reference: None,
        },
    )
}

fn ledger_inputs() -> impl Strategy<Value = (CustomerId, Vec<SourceInvoice>, Vec<SourcePayment>)> {
    let customer = CustomerId::new();
    (
        Just(customer),
        prop::collection::vec(invoice_for(customer), 0..12),
        prop::collection::vec(payment_for(customer), 0..12),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Rebuilding from identical inputs yields the identical ledger.
    #[test]
    fn prop_build_is_idempotent(
        (customer, invoices, payments) in ledger_inputs(),
    ) {
        let options = LedgerOptions::default();
        let first = LedgerBuilder::build(customer, &invoices, &payments, &options).unwrap();
        let second = LedgerBuilder::build(customer, &invoices, &payments, &options).unwrap();

        prop_assert_eq!(first, second);
    }

    /// The aggregate shortcut equals the itemized closing balance over an
    /// unbounded window.
    #[test]
    fn prop_aggregate_equals_closing_balance(
        (customer, invoices, payments) in ledger_inputs(),
    ) {
        let ledger = LedgerBuilder::build(
            customer,
            &invoices,
            &payments,
            &LedgerOptions::default(),
        )
        .unwrap();
        let aggregate = BalanceAggregator::aggregate(&invoices, &payments);

        prop_assert_eq!(aggregate, ledger.closing_balance);
        prop_assert!(BalanceAggregator::verify(aggregate, &ledger).is_ok());
    }

    /// Closing balance equals opening balance plus the signed sum of all
    /// included transactions.
    #[test]
    fn prop_closing_is_opening_plus_signed_sum(
        (customer, invoices, payments) in ledger_inputs(),
        opening in -1_000_000i64..1_000_000i64,
    ) {
        let options = LedgerOptions {
            opening_balance: Decimal::new(opening, 2),
            ..Default::default()
        };
        let ledger =
            LedgerBuilder::build(customer, &invoices, &payments, &options).unwrap();

        let signed_sum: Decimal = ledger
            .entries
            .iter()
            .map(|entry| entry.debit - entry.credit)
            .sum();
        prop_assert_eq!(
            ledger.closing_balance,
            ledger.opening_balance + signed_sum
        );
    }

    /// Entries come out date-ascending, with invoices before payments on
    /// equal dates, no matter how the inputs were ordered.
    #[test]
    fn prop_order_is_deterministic_under_input_shuffle(
        (customer, mut invoices, mut payments) in ledger_inputs(),
    ) {
        let options = LedgerOptions::default();
        let forward =
            LedgerBuilder::build(customer, &invoices, &payments, &options).unwrap();

        for window in forward.entries.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            prop_assert!(a.date <= b.date);
            if a.date == b.date && a.kind == EntryKind::Payment {
                prop_assert_eq!(b.kind, EntryKind::Payment);
            }
        }

        // Reversing each input slice must not change the closing balance
        // or the (date, kind, amount) content; entries sharing an
        // identical sort key may permute among themselves.
        invoices.reverse();
        payments.reverse();
        let reversed =
            LedgerBuilder::build(customer, &invoices, &payments, &options).unwrap();

        prop_assert_eq!(forward.closing_balance, reversed.closing_balance);
        let keys = |ledger: &super::types::Ledger| -> Vec<(NaiveDate, u8, Decimal, Decimal)> {
            let mut keys: Vec<_> = ledger
                .entries
                .iter()
                .map(|entry| (entry.date, entry.kind.tie_break_rank(), entry.debit, entry.credit))
                .collect();
            keys.sort();
            keys
        };
        prop_assert_eq!(keys(&forward), keys(&reversed));
    }
}
