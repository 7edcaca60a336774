//! Payment repository for database operations.
//!
//! Allocation changes always run in one database transaction: the prior
//! allocation rows, the new rows, and the affected invoice statuses move
//! together or not at all.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use khata_core::allocation::{
    AllocationEngine, AllocationError, AllocationPlan, AllocationRequest, InvoiceState,
    PaymentState,
};
use khata_core::invoice::derive_status;
use khata_shared::types::{InvoiceId, PaymentId};

use crate::entities::{
    invoices, payment_allocations, payments,
    sea_orm_active_enums::{InvoiceStatus, PaymentMethod},
};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Payment not found.
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// A requested invoice does not exist.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// A requested invoice belongs to a different customer.
    #[error("Invoice {invoice_id} does not belong to customer {customer_id}")]
    InvoiceCustomerMismatch {
        /// The requested invoice.
        invoice_id: Uuid,
        /// The paying customer.
        customer_id: Uuid,
    },

    /// The requested distribution violated an allocation rule.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Paying customer.
    pub customer_id: Uuid,
    /// Payment amount (positive).
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// Payment date.
    pub date: NaiveDate,
    /// External reference (cheque number, UPI txn id, ...).
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Optional immediate allocation against the customer's invoices.
    pub allocations: Vec<AllocationRequest>,
}

/// Filter options for listing payments.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by date range start (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub date_to: Option<NaiveDate>,
}

/// Payment with its allocation rows.
#[derive(Debug, Clone)]
pub struct PaymentWithAllocations {
    /// Payment header.
    pub payment: payments::Model,
    /// Allocation rows.
    pub allocations: Vec<payment_allocations::Model>,
}

/// Payment repository for CRUD operations and allocation application.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment and applies its initial allocations, in one
    /// database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation request violates a rule or a
    /// database operation fails. Nothing is persisted on error.
    pub async fn create(
        &self,
        input: CreatePaymentInput,
    ) -> Result<PaymentWithAllocations, PaymentError> {
        let txn = self.db.begin().await?;

        let now = Utc::now().into();
        let payment = payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            customer_id: Set(input.customer_id),
            amount: Set(input.amount),
            method: Set(input.method),
            date: Set(input.date),
            reference: Set(input.reference),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let payment = payment.insert(&txn).await?;

        let allocations = Self::replace_allocations_in(&txn, &payment, &input.allocations).await?;

        txn.commit().await?;
        info!(
            payment_id = %payment.id,
            customer_id = %payment.customer_id,
            amount = %payment.amount,
            allocations = allocations.len(),
            "Recorded payment"
        );

        Ok(PaymentWithAllocations {
            payment,
            allocations,
        })
    }

    /// Finds a payment with its allocation rows.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the payment does not exist.
    pub async fn find_with_allocations(
        &self,
        id: Uuid,
    ) -> Result<PaymentWithAllocations, PaymentError> {
        let payment = payments::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(PaymentError::NotFound(id))?;

        let allocations = payment
            .find_related(payment_allocations::Entity)
            .all(&self.db)
            .await?;

        Ok(PaymentWithAllocations {
            payment,
            allocations,
        })
    }

    /// Lists payments matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, filter: PaymentFilter) -> Result<Vec<payments::Model>, PaymentError> {
        let mut query = payments::Entity::find();

        if let Some(customer_id) = filter.customer_id {
            query = query.filter(payments::Column::CustomerId.eq(customer_id));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(payments::Column::Date.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(payments::Column::Date.lte(to));
        }

        Ok(query
            .order_by_desc(payments::Column::Date)
            .order_by_desc(payments::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Replaces a payment's allocations with the requested distribution,
    /// in one database transaction.
    ///
    /// Prior allocation rows are removed first, so the requested amounts
    /// are validated against what OTHER payments cover. Invoices that lose
    /// or gain coverage get their status re-derived from the surviving
    /// rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request violates an allocation rule or a
    /// database operation fails. Nothing changes on error.
    pub async fn apply_allocations(
        &self,
        payment_id: Uuid,
        requests: &[AllocationRequest],
    ) -> Result<PaymentWithAllocations, PaymentError> {
        let txn = self.db.begin().await?;

        let payment = payments::Entity::find_by_id(payment_id)
            .one(&txn)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?;

        let allocations = Self::replace_allocations_in(&txn, &payment, requests).await?;

        txn.commit().await?;
        info!(
            payment_id = %payment_id,
            allocations = allocations.len(),
            "Replaced payment allocations"
        );

        Ok(PaymentWithAllocations {
            payment,
            allocations,
        })
    }

    /// Deletes a payment and its allocations, re-deriving the statuses of
    /// the invoices it covered.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the payment does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), PaymentError> {
        let txn = self.db.begin().await?;

        let payment = payments::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(PaymentError::NotFound(id))?;

        let prior = payment
            .find_related(payment_allocations::Entity)
            .all(&txn)
            .await?;
        let affected: Vec<Uuid> = prior.iter().map(|row| row.invoice_id).collect();

        payment.delete(&txn).await?;
        Self::refresh_statuses(&txn, &affected).await?;

        txn.commit().await?;
        info!(payment_id = %id, invoices = affected.len(), "Deleted payment");

        Ok(())
    }

    /// Removes the payment's current allocations, validates the new
    /// distribution against the engine, inserts the new rows, and
    /// refreshes every touched invoice's status.
    async fn replace_allocations_in(
        txn: &DatabaseTransaction,
        payment: &payments::Model,
        requests: &[AllocationRequest],
    ) -> Result<Vec<payment_allocations::Model>, PaymentError> {
        let prior = payment_allocations::Entity::find()
            .filter(payment_allocations::Column::PaymentId.eq(payment.id))
            .all(txn)
            .await?;

        payment_allocations::Entity::delete_many()
            .filter(payment_allocations::Column::PaymentId.eq(payment.id))
            .exec(txn)
            .await?;

        let plan = Self::plan_allocations(txn, payment, requests).await?;

        let now = Utc::now().into();
        let mut inserted = Vec::with_capacity(plan.allocations.len());
        for planned in &plan.allocations {
            let row = payment_allocations::ActiveModel {
                id: Set(Uuid::now_v7()),
                payment_id: Set(payment.id),
                invoice_id: Set(planned.invoice_id.into_inner()),
                amount: Set(planned.amount),
                created_at: Set(now),
            };
            inserted.push(row.insert(txn).await?);
        }

        let mut affected: HashSet<Uuid> = prior.iter().map(|row| row.invoice_id).collect();
        affected.extend(inserted.iter().map(|row| row.invoice_id));
        let affected: Vec<Uuid> = affected.into_iter().collect();
        Self::refresh_statuses(txn, &affected).await?;

        Ok(inserted)
    }

    /// Loads the requested invoices and runs the allocation engine.
    async fn plan_allocations(
        txn: &DatabaseTransaction,
        payment: &payments::Model,
        requests: &[AllocationRequest],
    ) -> Result<AllocationPlan, PaymentError> {
        let mut states = Vec::with_capacity(requests.len());

        for request in requests {
            let invoice_id = request.invoice_id.into_inner();
            let invoice = invoices::Entity::find_by_id(invoice_id)
                .one(txn)
                .await?
                .ok_or(PaymentError::InvoiceNotFound(invoice_id))?;

            if invoice.customer_id != Some(payment.customer_id) {
                return Err(PaymentError::InvoiceCustomerMismatch {
                    invoice_id,
                    customer_id: payment.customer_id,
                });
            }

            let allocated =
                super::invoice::InvoiceRepository::allocated_amount(txn, invoice_id).await?;
            states.push(InvoiceState {
                id: InvoiceId::from_uuid(invoice_id),
                status: invoice.status.into(),
                total: invoice.total,
                allocated,
            });
        }

        let state = PaymentState {
            id: PaymentId::from_uuid(payment.id),
            amount: payment.amount,
        };

        Ok(AllocationEngine::plan(&state, &states, requests)?)
    }

    /// Re-derives the status of each invoice from its surviving
    /// allocation rows. Drafts are left untouched.
    async fn refresh_statuses<C: ConnectionTrait>(
        conn: &C,
        invoice_ids: &[Uuid],
    ) -> Result<(), PaymentError> {
        for &invoice_id in invoice_ids {
            let Some(invoice) = invoices::Entity::find_by_id(invoice_id).one(conn).await? else {
                continue;
            };
            if invoice.status == InvoiceStatus::Draft {
                continue;
            }

            let allocated =
                super::invoice::InvoiceRepository::allocated_amount(conn, invoice_id).await?;
            let status: InvoiceStatus = derive_status(invoice.total, allocated).into();
            if status == invoice.status {
                continue;
            }

            let mut active: invoices::ActiveModel = invoice.into();
            active.status = Set(status);
            active.updated_at = Set(Utc::now().into());
            active.update(conn).await?;
        }

        Ok(())
    }
}
