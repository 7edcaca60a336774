//! Customer domain types.
//!
//! Customers are never hard-deleted; deletion is a lifecycle state so that
//! "excluded from balance" is an explicit, exhaustively-handled case.

use chrono::{DateTime, FixedOffset};
use khata_shared::types::CustomerId;
use serde::{Deserialize, Serialize};

/// Customer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Lifecycle {
    /// Customer is active and included in ledger/balance computation.
    Active,
    /// Customer was soft-deleted and must be excluded everywhere.
    Deleted {
        /// When the customer was deleted.
        at: DateTime<FixedOffset>,
    },
}

impl Lifecycle {
    /// Builds a lifecycle state from a nullable `deleted_at` column.
    #[must_use]
    pub const fn from_deleted_at(deleted_at: Option<DateTime<FixedOffset>>) -> Self {
        match deleted_at {
            None => Self::Active,
            Some(at) => Self::Deleted { at },
        }
    }

    /// Returns the nullable `deleted_at` column value for persistence.
    #[must_use]
    pub const fn deleted_at(self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Active => None,
            Self::Deleted { at } => Some(at),
        }
    }

    /// Returns true if the customer participates in ledger computation.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// The customer fields the core needs for statements and balance sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRef {
    /// Unique identifier.
    pub id: CustomerId,
    /// Human-readable customer code (e.g., "CUST-0042").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Phone number, if known.
    pub phone: Option<String>,
    /// Lifecycle state.
    pub lifecycle: Lifecycle,
}

/// Formats a human-readable customer code from a sequence number.
#[must_use]
pub fn customer_code(sequence: u32) -> String {
    format!("CUST-{sequence:04}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_time() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-01T10:00:00+05:30").unwrap()
    }

    #[test]
    fn test_lifecycle_from_deleted_at() {
        assert_eq!(Lifecycle::from_deleted_at(None), Lifecycle::Active);
        assert_eq!(
            Lifecycle::from_deleted_at(Some(some_time())),
            Lifecycle::Deleted { at: some_time() }
        );
    }

    #[test]
    fn test_lifecycle_roundtrip() {
        for deleted_at in [None, Some(some_time())] {
            assert_eq!(
                Lifecycle::from_deleted_at(deleted_at).deleted_at(),
                deleted_at
            );
        }
    }

    #[test]
    fn test_is_active() {
        assert!(Lifecycle::Active.is_active());
        assert!(!Lifecycle::Deleted { at: some_time() }.is_active());
    }

    #[test]
    fn test_customer_code_format() {
        assert_eq!(customer_code(1), "CUST-0001");
        assert_eq!(customer_code(42), "CUST-0042");
        assert_eq!(customer_code(12345), "CUST-12345");
    }
}
