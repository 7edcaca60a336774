//! Allocation error types.

use khata_shared::types::{InvoiceId, PaymentId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while planning payment allocations.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Allocation amounts must be strictly positive.
    #[error("Allocation amount for invoice {invoice_id} must be positive, got {amount}")]
    NonPositiveAmount {
        /// Target invoice.
        invoice_id: InvoiceId,
        /// The offending amount.
        amount: Decimal,
    },

    /// The same invoice appeared twice in one request.
    #[error("Invoice {0} appears more than once in the allocation request")]
    DuplicateInvoice(InvoiceId),

    /// The request references an invoice the caller did not load.
    #[error("Invoice {0} not found among the payment's candidate invoices")]
    UnknownInvoice(InvoiceId),

    /// Draft invoices cannot be allocated against.
    #[error("Invoice {0} is a draft and cannot receive allocations")]
    DraftInvoice(InvoiceId),

    /// A payment cannot allocate more than it is worth.
    #[error(
        "Allocations total {requested} exceeds payment {payment_id} amount {payment_amount}"
    )]
    ExceedsPayment {
        /// The payment being allocated.
        payment_id: PaymentId,
        /// The payment's amount.
        payment_amount: Decimal,
        /// Sum of the requested allocations.
        requested: Decimal,
    },

    /// An invoice cannot be over-paid.
    #[error(
        "Allocating {requested} to invoice {invoice_id} exceeds its total {invoice_total} \
         (already allocated: {already_allocated})"
    )]
    ExceedsInvoice {
        /// Target invoice.
        invoice_id: InvoiceId,
        /// The invoice total.
        invoice_total: Decimal,
        /// Allocations already applied from other payments.
        already_allocated: Decimal,
        /// The requested amount.
        requested: Decimal,
    },
}

impl AllocationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::DuplicateInvoice(_) => "DUPLICATE_INVOICE",
            Self::UnknownInvoice(_) => "UNKNOWN_INVOICE",
            Self::DraftInvoice(_) => "DRAFT_INVOICE",
            Self::ExceedsPayment { .. } => "EXCEEDS_PAYMENT",
            Self::ExceedsInvoice { .. } => "EXCEEDS_INVOICE",
        }
    }
}
