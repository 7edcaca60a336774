//! Invoice status derivation from allocation coverage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice status.
///
/// `Draft` is the only caller-controlled state; the other three are derived
/// from how much of the invoice total has been allocated from payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Being drafted; no financial effect yet.
    Draft,
    /// Nothing allocated.
    Unpaid,
    /// Partially covered by allocations.
    Partial,
    /// Fully covered by allocations.
    Paid,
}

impl InvoiceStatus {
    /// Returns true if the invoice participates in ledger computation.
    #[must_use]
    pub const fn has_financial_effect(self) -> bool {
        !matches!(self, Self::Draft)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Unpaid => write!(f, "unpaid"),
            Self::Partial => write!(f, "partial"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "unpaid" => Ok(Self::Unpaid),
            "partial" => Ok(Self::Partial),
            "paid" => Ok(Self::Paid),
            _ => Err(format!("Unknown invoice status: {s}")),
        }
    }
}

/// Derives the status of a non-draft invoice from its allocation coverage.
///
/// Rules:
/// - allocated = 0 → `Unpaid`
/// - 0 < allocated < total → `Partial`
/// - allocated >= total → `Paid`
///
/// A zero-total invoice with no allocations is `Unpaid` (it has not been
/// settled by anything; the `Paid` rule only applies once money has moved).
#[must_use]
pub fn derive_status(total: Decimal, allocated: Decimal) -> InvoiceStatus {
    if allocated <= Decimal::ZERO {
        InvoiceStatus::Unpaid
    } else if allocated >= total {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[rstest]
    #[case(dec!(1000), dec!(0), InvoiceStatus::Unpaid)]
    #[case(dec!(1000), dec!(400), InvoiceStatus::Partial)]
    #[case(dec!(1000), dec!(1000), InvoiceStatus::Paid)]
    #[case(dec!(1000), dec!(999.99), InvoiceStatus::Partial)]
    #[case(dec!(1000), dec!(0.01), InvoiceStatus::Partial)]
    #[case(dec!(0), dec!(0), InvoiceStatus::Unpaid)]
    fn test_derive_status(
        #[case] total: Decimal,
        #[case] allocated: Decimal,
        #[case] expected: InvoiceStatus,
    ) {
        assert_eq!(derive_status(total, allocated), expected);
    }

    #[test]
    fn test_financial_effect() {
        assert!(!InvoiceStatus::Draft.has_financial_effect());
        assert!(InvoiceStatus::Unpaid.has_financial_effect());
        assert!(InvoiceStatus::Partial.has_financial_effect());
        assert!(InvoiceStatus::Paid.has_financial_effect());
    }

    #[test]
    fn test_display_roundtrip() {
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Unpaid,
            InvoiceStatus::Partial,
            InvoiceStatus::Paid,
        ] {
            assert_eq!(
                InvoiceStatus::from_str(&status.to_string()).unwrap(),
                status
            );
        }
    }
}
