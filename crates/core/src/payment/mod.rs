//! Payment domain types.

use serde::{Deserialize, Serialize};

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash payment.
    Cash,
    /// Card payment.
    Card,
    /// UPI transfer.
    Upi,
    /// Bank transfer (NEFT/RTGS/IMPS).
    BankTransfer,
    /// Cheque.
    Cheque,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Card => write!(f, "card"),
            Self::Upi => write!(f, "upi"),
            Self::BankTransfer => write!(f, "bank_transfer"),
            Self::Cheque => write!(f, "cheque"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "upi" => Ok(Self::Upi),
            "bank_transfer" => Ok(Self::BankTransfer),
            "cheque" => Ok(Self::Cheque),
            _ => Err(format!("Unknown payment method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_display_roundtrip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Card,
            PaymentMethod::Upi,
            PaymentMethod::BankTransfer,
            PaymentMethod::Cheque,
        ] {
            assert_eq!(
                PaymentMethod::from_str(&method.to_string()).unwrap(),
                method
            );
        }
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!(
            PaymentMethod::from_str("CASH").unwrap(),
            PaymentMethod::Cash
        );
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!(PaymentMethod::from_str("barter").is_err());
    }
}
