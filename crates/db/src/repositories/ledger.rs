//! Ledger read-model repository.
//!
//! Fetches a customer's invoices and payments and hands them to the pure
//! ledger core. No balance is ever stored; every number is recomputed
//! from the rows on each call.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use khata_core::customer::{CustomerRef, Lifecycle};
use khata_core::ledger::{
    rank_balances, BalanceAggregator, CustomerBalance, Ledger, LedgerBuilder, LedgerError,
    LedgerOptions, SourceInvoice, SourcePayment,
};
use khata_core::statement::{format_statement, wa_me_url};
use khata_shared::types::{CustomerId, InvoiceId, PaymentId};

use crate::entities::{customers, invoices, payment_allocations, payments};

/// Error types for ledger queries.
#[derive(Debug, thiserror::Error)]
pub enum LedgerQueryError {
    /// Customer not found or soft-deleted.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// The ledger core rejected the fetched rows.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A formatted statement with its share link.
#[derive(Debug, Clone)]
pub struct Statement {
    /// WhatsApp-style plain-text statement.
    pub message: String,
    /// `wa.me` share URL, present when the customer has a phone number.
    pub share_url: Option<String>,
}

/// Ledger repository: reconstruction, balances, statements.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reconstructs a customer's ledger under the given options.
    ///
    /// # Errors
    ///
    /// Returns `CustomerNotFound` for missing or soft-deleted customers,
    /// or a core error if the fetched rows are inconsistent.
    pub async fn build_ledger(
        &self,
        customer_id: Uuid,
        options: LedgerOptions,
    ) -> Result<Ledger, LedgerQueryError> {
        self.find_active_customer(customer_id).await?;
        let (invoices, payments) = self.fetch_sources(customer_id).await?;

        let ledger = LedgerBuilder::build(
            CustomerId::from_uuid(customer_id),
            &invoices,
            &payments,
            &options,
        )?;

        Ok(ledger)
    }

    /// Computes a customer's balance by aggregation and cross-checks it
    /// against the itemized ledger's closing balance.
    ///
    /// # Errors
    ///
    /// Returns `CustomerNotFound`, a `BalanceMismatch` if the two paths
    /// disagree, or a database error.
    pub async fn get_balance(&self, customer_id: Uuid) -> Result<Decimal, LedgerQueryError> {
        self.find_active_customer(customer_id).await?;
        let (invoices, payments) = self.fetch_sources(customer_id).await?;

        let aggregate = BalanceAggregator::aggregate(&invoices, &payments);
        let ledger = LedgerBuilder::build(
            CustomerId::from_uuid(customer_id),
            &invoices,
            &payments,
            &LedgerOptions::default(),
        )?;
        BalanceAggregator::verify(aggregate, &ledger)?;

        Ok(aggregate)
    }

    /// Computes every active customer's balance, dropping zero balances
    /// and ranking by absolute magnitude.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn get_all_balances(&self) -> Result<Vec<CustomerBalance>, LedgerQueryError> {
        let customers = customers::Entity::find()
            .filter(customers::Column::DeletedAt.is_null())
            .all(&self.db)
            .await?;

        let mut balances = Vec::with_capacity(customers.len());
        for customer in customers {
            let (invoices, payments) = self.fetch_sources(customer.id).await?;
            balances.push(CustomerBalance {
                customer_id: CustomerId::from_uuid(customer.id),
                customer_code: customer.customer_code,
                customer_name: customer.name,
                balance: BalanceAggregator::aggregate(&invoices, &payments),
            });
        }

        Ok(rank_balances(balances))
    }

    /// Builds a customer's full-history statement and share link.
    ///
    /// # Errors
    ///
    /// Returns `CustomerNotFound` or a core/database error.
    pub async fn statement(&self, customer_id: Uuid) -> Result<Statement, LedgerQueryError> {
        let customer = self.find_active_customer(customer_id).await?;
        let (invoices, payments) = self.fetch_sources(customer_id).await?;

        let ledger = LedgerBuilder::build(
            CustomerId::from_uuid(customer_id),
            &invoices,
            &payments,
            &LedgerOptions::default(),
        )?;

        let customer_ref = CustomerRef {
            id: CustomerId::from_uuid(customer.id),
            code: customer.customer_code,
            name: customer.name,
            phone: customer.phone,
            lifecycle: Lifecycle::from_deleted_at(customer.deleted_at),
        };

        let message = format_statement(&customer_ref, &ledger);
        let share_url = customer_ref
            .phone
            .as_deref()
            .map(|phone| wa_me_url(phone, &message));

        Ok(Statement { message, share_url })
    }

    async fn find_active_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<customers::Model, LedgerQueryError> {
        customers::Entity::find_by_id(customer_id)
            .filter(customers::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(LedgerQueryError::CustomerNotFound(customer_id))
    }

    /// Fetches a customer's invoices (with allocation sums) and payments
    /// as the core consumes them.
    async fn fetch_sources(
        &self,
        customer_id: Uuid,
    ) -> Result<(Vec<SourceInvoice>, Vec<SourcePayment>), LedgerQueryError> {
        let invoice_rows = invoices::Entity::find()
            .filter(invoices::Column::CustomerId.eq(customer_id))
            .all(&self.db)
            .await?;

        let invoice_ids: Vec<Uuid> = invoice_rows.iter().map(|row| row.id).collect();
        let mut allocated: HashMap<Uuid, Decimal> = HashMap::with_capacity(invoice_ids.len());
        if !invoice_ids.is_empty() {
            let rows = payment_allocations::Entity::find()
                .filter(payment_allocations::Column::InvoiceId.is_in(invoice_ids))
                .all(&self.db)
                .await?;
            for row in rows {
                *allocated.entry(row.invoice_id).or_default() += row.amount;
            }
        }

        let invoices = invoice_rows
            .into_iter()
            .map(|row| SourceInvoice {
                allocated: allocated.get(&row.id).copied().unwrap_or_default(),
                id: InvoiceId::from_uuid(row.id),
                customer_id: row.customer_id.map(CustomerId::from_uuid),
                invoice_no: row.invoice_no,
                date: row.date,
                status: row.status.into(),
                total: row.total,
            })
            .collect();

        let payments = payments::Entity::find()
            .filter(payments::Column::CustomerId.eq(customer_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| SourcePayment {
                id: PaymentId::from_uuid(row.id),
                customer_id: CustomerId::from_uuid(row.customer_id),
                amount: row.amount,
                method: row.method.into(),
                date: row.date,
                reference: row.reference,
            })
            .collect();

        Ok((invoices, payments))
    }
}
