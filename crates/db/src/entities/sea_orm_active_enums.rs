//! Postgres enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice status enum (`invoice_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Being drafted; no financial effect yet.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Nothing allocated.
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Partially covered by allocations.
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Fully covered by allocations.
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl From<InvoiceStatus> for khata_core::invoice::InvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Unpaid => Self::Unpaid,
            InvoiceStatus::Partial => Self::Partial,
            InvoiceStatus::Paid => Self::Paid,
        }
    }
}

impl From<khata_core::invoice::InvoiceStatus> for InvoiceStatus {
    fn from(status: khata_core::invoice::InvoiceStatus) -> Self {
        match status {
            khata_core::invoice::InvoiceStatus::Draft => Self::Draft,
            khata_core::invoice::InvoiceStatus::Unpaid => Self::Unpaid,
            khata_core::invoice::InvoiceStatus::Partial => Self::Partial,
            khata_core::invoice::InvoiceStatus::Paid => Self::Paid,
        }
    }
}

/// Payment method enum (`payment_method`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash payment.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Card payment.
    #[sea_orm(string_value = "card")]
    Card,
    /// UPI transfer.
    #[sea_orm(string_value = "upi")]
    Upi,
    /// Bank transfer.
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Cheque.
    #[sea_orm(string_value = "cheque")]
    Cheque,
}

impl From<PaymentMethod> for khata_core::payment::PaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Card => Self::Card,
            PaymentMethod::Upi => Self::Upi,
            PaymentMethod::BankTransfer => Self::BankTransfer,
            PaymentMethod::Cheque => Self::Cheque,
        }
    }
}

impl From<khata_core::payment::PaymentMethod> for PaymentMethod {
    fn from(method: khata_core::payment::PaymentMethod) -> Self {
        match method {
            khata_core::payment::PaymentMethod::Cash => Self::Cash,
            khata_core::payment::PaymentMethod::Card => Self::Card,
            khata_core::payment::PaymentMethod::Upi => Self::Upi,
            khata_core::payment::PaymentMethod::BankTransfer => Self::BankTransfer,
            khata_core::payment::PaymentMethod::Cheque => Self::Cheque,
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Iterable;

    use super::*;

    #[test]
    fn test_invoice_status_roundtrips_through_core() {
        for status in InvoiceStatus::iter() {
            let core: khata_core::invoice::InvoiceStatus = status.clone().into();
            assert_eq!(InvoiceStatus::from(core), status);
        }
    }

    #[test]
    fn test_payment_method_roundtrips_through_core() {
        for method in PaymentMethod::iter() {
            let core: khata_core::payment::PaymentMethod = method.clone().into();
            assert_eq!(PaymentMethod::from(core), method);
        }
    }

    #[test]
    fn test_string_values_match_core_display() {
        use sea_orm::ActiveEnum;

        for method in PaymentMethod::iter() {
            let core: khata_core::payment::PaymentMethod = method.clone().into();
            assert_eq!(method.to_value(), core.to_string());
        }
    }
}
