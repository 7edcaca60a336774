//! Transaction normalizer.
//!
//! Converts heterogeneous source records (invoices, payments) into a
//! uniform transaction representation. Pure mapping, no side effects;
//! allocations never become transactions of their own.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{EntryKind, SourceInvoice, SourcePayment};

/// A source record reduced to the fields the ledger builder needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    /// The source invoice or payment ID.
    pub id: Uuid,
    /// Invoice or payment.
    pub kind: EntryKind,
    /// Transaction date.
    pub date: NaiveDate,
    /// Positive for invoices (debit), negative for payments (credit).
    pub signed_amount: Decimal,
    /// External reference, if any.
    pub reference: Option<String>,
    /// Human-readable description.
    pub description: String,
}

impl NormalizedTransaction {
    /// The unsigned magnitude of this transaction.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.signed_amount.abs()
    }
}

/// Normalizes an invoice into a debit transaction.
///
/// # Errors
///
/// Returns [`LedgerError::InvoiceWithoutCustomer`] if the invoice has no
/// customer association.
pub fn normalize_invoice(invoice: &SourceInvoice) -> Result<NormalizedTransaction, LedgerError> {
    if invoice.customer_id.is_none() {
        return Err(LedgerError::InvoiceWithoutCustomer(invoice.id));
    }

    Ok(NormalizedTransaction {
        id: invoice.id.into_inner(),
        kind: EntryKind::Invoice,
        date: invoice.date,
        signed_amount: invoice.total,
        reference: Some(invoice.invoice_no.clone()),
        description: format!("Invoice {}", invoice.invoice_no),
    })
}

/// Normalizes a payment into a credit transaction.
///
/// Infallible: a payment always belongs to exactly one customer, enforced
/// by `SourcePayment`'s type.
#[must_use]
pub fn normalize_payment(payment: &SourcePayment) -> NormalizedTransaction {
    let description = match &payment.reference {
        Some(reference) => format!("Payment - {} ({reference})", payment.method),
        None => format!("Payment - {}", payment.method),
    };

    NormalizedTransaction {
        id: payment.id.into_inner(),
        kind: EntryKind::Payment,
        date: payment.date,
        signed_amount: -payment.amount,
        reference: payment.reference.clone(),
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceStatus;
    use crate::payment::PaymentMethod;
    use khata_shared::types::{CustomerId, InvoiceId, PaymentId};
    use rust_decimal_macros::dec;

    fn invoice(customer_id: Option<CustomerId>) -> SourceInvoice {
        SourceInvoice {
            id: InvoiceId::new(),
            customer_id,
            invoice_no: "INV-20240101-0001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status: InvoiceStatus::Unpaid,
            total: dec!(1000),
            allocated: dec!(0),
        }
    }

    fn payment(reference: Option<&str>) -> SourcePayment {
        SourcePayment {
            id: PaymentId::new(),
            customer_id: CustomerId::new(),
            amount: dec!(600),
            method: PaymentMethod::Upi,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            reference: reference.map(str::to_string),
        }
    }

    #[test]
    fn test_invoice_normalizes_to_positive_debit() {
        let txn = normalize_invoice(&invoice(Some(CustomerId::new()))).unwrap();
        assert_eq!(txn.kind, EntryKind::Invoice);
        assert_eq!(txn.signed_amount, dec!(1000));
        assert_eq!(txn.amount(), dec!(1000));
        assert_eq!(txn.description, "Invoice INV-20240101-0001");
        assert_eq!(txn.reference.as_deref(), Some("INV-20240101-0001"));
    }

    #[test]
    fn test_payment_normalizes_to_negative_credit() {
        let txn = normalize_payment(&payment(None));
        assert_eq!(txn.kind, EntryKind::Payment);
        assert_eq!(txn.signed_amount, dec!(-600));
        assert_eq!(txn.amount(), dec!(600));
        assert_eq!(txn.description, "Payment - upi");
        assert_eq!(txn.reference, None);
    }

    #[test]
    fn test_payment_description_includes_reference() {
        let txn = normalize_payment(&payment(Some("TXN42")));
        assert_eq!(txn.description, "Payment - upi (TXN42)");
        assert_eq!(txn.reference.as_deref(), Some("TXN42"));
    }

    #[test]
    fn test_invoice_without_customer_rejected() {
        assert!(matches!(
            normalize_invoice(&invoice(None)),
            Err(LedgerError::InvoiceWithoutCustomer(_))
        ));
    }
}
