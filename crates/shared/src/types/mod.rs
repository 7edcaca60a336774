//! Shared type definitions.

pub mod id;
pub mod money;

pub use id::{AllocationId, CustomerId, InvoiceId, InvoiceItemId, PaymentId, UserId};
pub use money::{round_money, MONEY_DP};
