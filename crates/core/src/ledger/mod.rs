//! Per-customer ledger reconstruction and balance aggregation.
//!
//! This module implements the bookkeeping core:
//! - Normalizing invoices and payments into uniform transactions
//! - Rebuilding a chronological ledger with running balances
//! - Aggregating a single outstanding-balance figure per customer
//! - Error types for ledger operations

pub mod balance;
pub mod builder;
pub mod error;
pub mod normalize;
pub mod types;

#[cfg(test)]
mod builder_props;

pub use balance::{rank_balances, BalanceAggregator, CustomerBalance};
pub use builder::LedgerBuilder;
pub use error::LedgerError;
pub use normalize::{normalize_invoice, normalize_payment, NormalizedTransaction};
pub use types::{
    EntryKind, InvoiceScope, Ledger, LedgerEntry, LedgerOptions, SourceInvoice, SourcePayment,
};
