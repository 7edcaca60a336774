//! Ledger error types.

use khata_shared::types::{CustomerId, InvoiceId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while building ledgers or aggregating balances.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// An invoice without a customer association reached the builder.
    #[error("Invoice {0} has no customer association")]
    InvoiceWithoutCustomer(InvoiceId),

    /// A record for a different customer reached the builder.
    #[error("Record belongs to customer {found}, expected {expected}")]
    CustomerMismatch {
        /// The customer the ledger is being built for.
        expected: CustomerId,
        /// The customer the record actually belongs to.
        found: CustomerId,
    },

    /// The aggregate shortcut diverged from the itemized ledger.
    ///
    /// This should never occur in correct operation; it indicates a defect
    /// in the aggregator's filter logic, not a recoverable condition.
    #[error("Aggregate balance {aggregate} diverges from ledger closing balance {itemized}")]
    BalanceMismatch {
        /// Balance from the aggregate shortcut.
        aggregate: Decimal,
        /// Closing balance from the itemized ledger.
        itemized: Decimal,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvoiceWithoutCustomer(_) => "INVOICE_WITHOUT_CUSTOMER",
            Self::CustomerMismatch { .. } => "CUSTOMER_MISMATCH",
            Self::BalanceMismatch { .. } => "BALANCE_MISMATCH",
        }
    }
}
