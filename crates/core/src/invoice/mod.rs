//! Invoice totals, numbering, and status derivation.
//!
//! Invoice `status` is derived state: it reflects how much of the invoice
//! total has been covered by payment allocations, and is never set
//! independently. Totals are always recomputed from the full current item
//! set, never adjusted by deltas.

pub mod status;
pub mod totals;

pub use status::{derive_status, InvoiceStatus};
pub use totals::{InvoiceTotals, LineItem};

use chrono::NaiveDate;

/// Formats a generated invoice number: `INV-YYYYMMDD-NNNN`.
#[must_use]
pub fn invoice_no(date: NaiveDate, sequence: u32) -> String {
    format!("INV-{}-{sequence:04}", date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_no_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(invoice_no(date, 1), "INV-20240105-0001");
        assert_eq!(invoice_no(date, 9999), "INV-20240105-9999");
        assert_eq!(invoice_no(date, 10000), "INV-20240105-10000");
    }
}
