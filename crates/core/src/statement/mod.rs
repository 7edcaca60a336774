//! Text statement rendering of a built ledger.
//!
//! The formatter consumes a [`Ledger`](crate::ledger::Ledger) verbatim: it
//! never recomputes balances, only formats the entries and closing balance
//! it was given.

pub mod format;

pub use format::{format_inr, format_statement, wa_me_url};
