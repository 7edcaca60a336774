//! Payment-to-invoice allocation planning.
//!
//! The engine validates a requested distribution of a payment across
//! invoices and produces a plan (allocation rows + new invoice statuses)
//! for the persistence layer to apply atomically. Validation rejects bad
//! input outright; amounts are never clamped.

pub mod engine;
pub mod error;

pub use engine::{
    AllocationEngine, AllocationPlan, AllocationRequest, InvoiceState, PaymentState,
    PlannedAllocation,
};
pub use error::AllocationError;
