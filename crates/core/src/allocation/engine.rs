//! Allocation engine.
//!
//! Pure planning logic: given the payment, the current state of the
//! candidate invoices, and the requested distribution, either reject the
//! whole request or produce the exact rows and status transitions to
//! persist. Re-allocation is replace-not-merge: the caller removes the
//! payment's prior allocations before loading invoice states, so the
//! `allocated` figures here never include this payment's own rows.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use khata_shared::types::{InvoiceId, PaymentId};

use super::error::AllocationError;
use crate::invoice::{derive_status, InvoiceStatus};

/// The payment fields the engine needs.
#[derive(Debug, Clone, Copy)]
pub struct PaymentState {
    /// Payment ID.
    pub id: PaymentId,
    /// Payment amount - the ceiling for the allocation sum.
    pub amount: Decimal,
}

/// The invoice fields the engine needs.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceState {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Current status.
    pub status: InvoiceStatus,
    /// Invoice total.
    pub total: Decimal,
    /// Allocations already applied from OTHER payments.
    pub allocated: Decimal,
}

/// One requested allocation.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct AllocationRequest {
    /// Target invoice.
    pub invoice_id: InvoiceId,
    /// Amount to apply.
    pub amount: Decimal,
}

/// One validated allocation with the invoice's resulting status.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlannedAllocation {
    /// Target invoice.
    pub invoice_id: InvoiceId,
    /// Amount to apply.
    pub amount: Decimal,
    /// Status the invoice transitions to once this row is persisted.
    pub new_status: InvoiceStatus,
}

/// A validated allocation plan ready to persist.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationPlan {
    /// The payment being allocated.
    pub payment_id: PaymentId,
    /// Validated allocations.
    pub allocations: Vec<PlannedAllocation>,
    /// Sum of the planned allocations.
    pub allocated_total: Decimal,
    /// Remainder of the payment not tied to any invoice. Legitimate; it
    /// still reduces the customer's aggregate balance.
    pub unallocated: Decimal,
}

/// Allocation engine.
pub struct AllocationEngine;

impl AllocationEngine {
    /// Validates a requested distribution and produces a persistable plan.
    ///
    /// Rejections (never clamps, never partially applies):
    /// - non-positive amounts
    /// - duplicate invoice ids in one request
    /// - invoice ids not among the candidates, or draft invoices
    /// - allocation sum exceeding the payment amount
    /// - any allocation that would over-pay an invoice given what other
    ///   payments already cover
    ///
    /// An empty request is a valid plan: the payment simply stays
    /// unallocated.
    ///
    /// # Errors
    ///
    /// Returns `AllocationError` on the first violated rule.
    pub fn plan(
        payment: &PaymentState,
        invoices: &[InvoiceState],
        requests: &[AllocationRequest],
    ) -> Result<AllocationPlan, AllocationError> {
        let mut seen: HashSet<InvoiceId> = HashSet::with_capacity(requests.len());
        let mut allocations = Vec::with_capacity(requests.len());
        let mut allocated_total = Decimal::ZERO;

        for request in requests {
            if request.amount <= Decimal::ZERO {
                return Err(AllocationError::NonPositiveAmount {
                    invoice_id: request.invoice_id,
                    amount: request.amount,
                });
            }
            if !seen.insert(request.invoice_id) {
                return Err(AllocationError::DuplicateInvoice(request.invoice_id));
            }

            let invoice = invoices
                .iter()
                .find(|invoice| invoice.id == request.invoice_id)
                .ok_or(AllocationError::UnknownInvoice(request.invoice_id))?;
            if invoice.status == InvoiceStatus::Draft {
                return Err(AllocationError::DraftInvoice(invoice.id));
            }

            let covered = invoice.allocated + request.amount;
            if covered > invoice.total {
                return Err(AllocationError::ExceedsInvoice {
                    invoice_id: invoice.id,
                    invoice_total: invoice.total,
                    already_allocated: invoice.allocated,
                    requested: request.amount,
                });
            }

            allocated_total += request.amount;
            allocations.push(PlannedAllocation {
                invoice_id: invoice.id,
                amount: request.amount,
                new_status: derive_status(invoice.total, covered),
            });
        }

        if allocated_total > payment.amount {
            return Err(AllocationError::ExceedsPayment {
                payment_id: payment.id,
                payment_amount: payment.amount,
                requested: allocated_total,
            });
        }

        Ok(AllocationPlan {
            payment_id: payment.id,
            allocations,
            allocated_total,
            unallocated: payment.amount - allocated_total,
        })
    }
}
