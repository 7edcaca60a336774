//! Ledger domain types.

use chrono::NaiveDate;
use khata_shared::types::{CustomerId, InvoiceId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::invoice::InvoiceStatus;
use crate::payment::PaymentMethod;

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Invoice entry - a debit, increases what the customer owes.
    Invoice,
    /// Payment entry - a credit, decreases what the customer owes.
    Payment,
}

impl EntryKind {
    /// Sort rank for the same-date tie-break: invoices before payments.
    #[must_use]
    pub(crate) const fn tie_break_rank(self) -> u8 {
        match self {
            Self::Invoice => 0,
            Self::Payment => 1,
        }
    }
}

/// An invoice record as the ledger core consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInvoice {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Owning customer, if any. The ledger only considers invoices with a
    /// customer; a `None` here is a caller error.
    pub customer_id: Option<CustomerId>,
    /// Generated invoice number.
    pub invoice_no: String,
    /// Invoice date.
    pub date: NaiveDate,
    /// Derived status.
    pub status: InvoiceStatus,
    /// Invoice total (subtotal + tax - discount).
    pub total: Decimal,
    /// Sum of allocations already applied against this invoice.
    pub allocated: Decimal,
}

impl SourceInvoice {
    /// Amount not yet covered by allocations.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        self.total - self.allocated
    }
}

/// A payment record as the ledger core consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePayment {
    /// Payment ID.
    pub id: PaymentId,
    /// Owning customer. Payments always belong to exactly one customer.
    pub customer_id: CustomerId,
    /// Payment amount.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// Payment date.
    pub date: NaiveDate,
    /// External reference (cheque number, UPI txn id, ...).
    pub reference: Option<String>,
}

/// Which invoices appear in the printed ledger.
///
/// The balance aggregator always uses `All` semantics; `OutstandingOnly`
/// exists for printed statements that should skip invoices with no
/// remaining financial effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceScope {
    /// Every non-draft invoice.
    #[default]
    All,
    /// Only invoices still owed (outstanding > 0) or fully settled.
    OutstandingOnly,
}

impl std::str::FromStr for InvoiceScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "outstanding_only" | "outstanding" => Ok(Self::OutstandingOnly),
            _ => Err(format!("Unknown invoice scope: {s}")),
        }
    }
}

/// Options controlling ledger construction.
#[derive(Debug, Clone, Default)]
pub struct LedgerOptions {
    /// Balance carried in from before the window (0 if none).
    pub opening_balance: Decimal,
    /// Inclusive start of the date window.
    pub date_from: Option<NaiveDate>,
    /// Inclusive end of the date window.
    pub date_to: Option<NaiveDate>,
    /// Which invoices to include.
    pub scope: InvoiceScope,
}

/// One line of a reconstructed ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// The source invoice or payment ID.
    pub id: Uuid,
    /// Entry date.
    pub date: NaiveDate,
    /// Invoice or payment.
    pub kind: EntryKind,
    /// Human-readable description ("Invoice INV-...", "Payment - cash").
    pub description: String,
    /// External reference, if any.
    pub reference: Option<String>,
    /// Debit amount (invoice total, else 0).
    pub debit: Decimal,
    /// Credit amount (payment amount, else 0).
    pub credit: Decimal,
    /// Running balance AFTER this entry. Positive = customer owes us.
    pub balance: Decimal,
}

/// A reconstructed per-customer ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Chronologically ordered, balance-annotated entries.
    pub entries: Vec<LedgerEntry>,
    /// Balance before the first entry.
    pub opening_balance: Decimal,
    /// Balance after the last entry (= opening if no entries).
    pub closing_balance: Decimal,
}
