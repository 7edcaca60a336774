//! Invoice repository for database operations.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use khata_core::invoice::{derive_status, invoice_no, InvoiceTotals, LineItem};

use crate::entities::{
    invoice_items, invoices, payment_allocations, sea_orm_active_enums::InvoiceStatus,
};

/// Returns the sequence following the highest issued invoice number for
/// a date, or 1 when the date has none.
fn next_sequence(last_invoice_no: Option<&str>) -> u32 {
    last_invoice_no
        .and_then(|no| no.rsplit('-').next())
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .map_or(1, |seq| seq.saturating_add(1))
}

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// Invoice still has payment allocations against it.
    #[error("Invoice {0} has payment allocations, unapply them first")]
    HasAllocations(Uuid),

    /// A draft invoice cannot be reverted once issued.
    #[error("Invoice {0} is already issued")]
    AlreadyIssued(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for a single invoice line item.
#[derive(Debug, Clone)]
pub struct CreateInvoiceItemInput {
    /// Product name.
    pub product_name: String,
    /// Optional SKU.
    pub sku: Option<String>,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Tax percentage for this line.
    pub tax_percent: Decimal,
}

impl CreateInvoiceItemInput {
    fn as_line_item(&self) -> LineItem {
        LineItem {
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax_percent: self.tax_percent,
        }
    }
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// Owning customer, if any.
    pub customer_id: Option<Uuid>,
    /// Invoice date.
    pub date: NaiveDate,
    /// Line items.
    pub items: Vec<CreateInvoiceItemInput>,
    /// Invoice-level discount.
    pub discount: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Create as a draft with no financial effect.
    pub draft: bool,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<InvoiceStatus>,
    /// Filter by date range start (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub date_to: Option<NaiveDate>,
}

/// Invoice with its line items.
#[derive(Debug, Clone)]
pub struct InvoiceWithItems {
    /// Invoice header.
    pub invoice: invoices::Model,
    /// Line items.
    pub items: Vec<invoice_items::Model>,
}

/// Invoice repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice with items and a generated `INV-YYYYMMDD-NNNN`
    /// number, in one database transaction.
    ///
    /// Totals are computed from the items with the invoice-level discount
    /// applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operations fail.
    pub async fn create(&self, input: CreateInvoiceInput) -> Result<InvoiceWithItems, InvoiceError> {
        let txn = self.db.begin().await?;

        // The highest existing number for the date, not the row count:
        // counting would reissue a number after a hard delete.
        let last = invoices::Entity::find()
            .filter(invoices::Column::Date.eq(input.date))
            .order_by_desc(invoices::Column::InvoiceNo)
            .one(&txn)
            .await?;
        let sequence = next_sequence(last.as_ref().map(|row| row.invoice_no.as_str()));

        let line_items: Vec<LineItem> = input.items.iter().map(CreateInvoiceItemInput::as_line_item).collect();
        let totals = InvoiceTotals::from_items(&line_items, input.discount);

        let status = if input.draft {
            InvoiceStatus::Draft
        } else {
            InvoiceStatus::Unpaid
        };

        let now = Utc::now().into();
        let invoice = invoices::ActiveModel {
            id: Set(Uuid::now_v7()),
            customer_id: Set(input.customer_id),
            invoice_no: Set(invoice_no(input.date, sequence)),
            date: Set(input.date),
            status: Set(status),
            subtotal: Set(totals.subtotal),
            tax: Set(totals.tax),
            discount: Set(totals.discount),
            total: Set(totals.total),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let invoice = invoice.insert(&txn).await?;

        let items = Self::insert_items(&txn, invoice.id, &input.items).await?;

        txn.commit().await?;
        info!(
            invoice_id = %invoice.id,
            invoice_no = %invoice.invoice_no,
            total = %invoice.total,
            "Created invoice"
        );

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Finds an invoice with its items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the invoice does not exist.
    pub async fn find_with_items(&self, id: Uuid) -> Result<InvoiceWithItems, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let items = invoice
            .find_related(invoice_items::Entity)
            .all(&self.db)
            .await?;

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Lists invoices matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, filter: InvoiceFilter) -> Result<Vec<invoices::Model>, InvoiceError> {
        let mut query = invoices::Entity::find();

        if let Some(customer_id) = filter.customer_id {
            query = query.filter(invoices::Column::CustomerId.eq(customer_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(invoices::Column::Status.eq(status));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(invoices::Column::Date.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(invoices::Column::Date.lte(to));
        }

        Ok(query
            .order_by_desc(invoices::Column::Date)
            .order_by_desc(invoices::Column::InvoiceNo)
            .all(&self.db)
            .await?)
    }

    /// Replaces an invoice's items, recomputes its totals, and re-derives
    /// its status from existing allocations, in one database transaction.
    ///
    /// Drafts stay drafts regardless of the recomputed totals.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the invoice does not exist.
    pub async fn replace_items(
        &self,
        id: Uuid,
        items: Vec<CreateInvoiceItemInput>,
        discount: Decimal,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        invoice_items::Entity::delete_many()
            .filter(invoice_items::Column::InvoiceId.eq(id))
            .exec(&txn)
            .await?;
        let inserted = Self::insert_items(&txn, id, &items).await?;

        let line_items: Vec<LineItem> = items.iter().map(CreateInvoiceItemInput::as_line_item).collect();
        let totals = InvoiceTotals::from_items(&line_items, discount);
        let allocated = Self::allocated_amount(&txn, id).await?;

        let status = if invoice.status == InvoiceStatus::Draft {
            InvoiceStatus::Draft
        } else {
            derive_status(totals.total, allocated).into()
        };

        let mut active: invoices::ActiveModel = invoice.into();
        active.subtotal = Set(totals.subtotal);
        active.tax = Set(totals.tax);
        active.discount = Set(totals.discount);
        active.total = Set(totals.total);
        active.status = Set(status);
        active.updated_at = Set(Utc::now().into());
        let invoice = active.update(&txn).await?;

        txn.commit().await?;
        info!(
            invoice_id = %invoice.id,
            total = %invoice.total,
            "Replaced invoice items"
        );

        Ok(InvoiceWithItems {
            invoice,
            items: inserted,
        })
    }

    /// Issues a draft invoice, giving it financial effect.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the invoice does not exist, `AlreadyIssued`
    /// if it is not a draft.
    pub async fn issue(&self, id: Uuid) -> Result<invoices::Model, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        if invoice.status != InvoiceStatus::Draft {
            return Err(InvoiceError::AlreadyIssued(id));
        }

        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(InvoiceStatus::Unpaid);
        active.updated_at = Set(Utc::now().into());
        let invoice = active.update(&self.db).await?;
        info!(invoice_id = %id, invoice_no = %invoice.invoice_no, "Issued invoice");

        Ok(invoice)
    }

    /// Deletes an invoice and its items.
    ///
    /// Refuses if any payment allocation still points at the invoice, so
    /// a delete can never silently distort a payment's allocation record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `HasAllocations`.
    pub async fn delete(&self, id: Uuid) -> Result<(), InvoiceError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let allocations = payment_allocations::Entity::find()
            .filter(payment_allocations::Column::InvoiceId.eq(id))
            .count(&txn)
            .await?;
        if allocations > 0 {
            return Err(InvoiceError::HasAllocations(id));
        }

        invoice.delete(&txn).await?;
        txn.commit().await?;
        info!(invoice_id = %id, "Deleted invoice");

        Ok(())
    }

    async fn insert_items<C: ConnectionTrait>(
        conn: &C,
        invoice_id: Uuid,
        items: &[CreateInvoiceItemInput],
    ) -> Result<Vec<invoice_items::Model>, InvoiceError> {
        let now = Utc::now().into();
        let mut inserted = Vec::with_capacity(items.len());

        for item in items {
            let row = invoice_items::ActiveModel {
                id: Set(Uuid::now_v7()),
                invoice_id: Set(invoice_id),
                product_name: Set(item.product_name.clone()),
                sku: Set(item.sku.clone()),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                tax_percent: Set(item.tax_percent),
                created_at: Set(now),
            };
            inserted.push(row.insert(conn).await?);
        }

        Ok(inserted)
    }

    /// Sums existing allocations against an invoice.
    pub(crate) async fn allocated_amount<C: ConnectionTrait>(
        conn: &C,
        invoice_id: Uuid,
    ) -> Result<Decimal, DbErr> {
        let rows = payment_allocations::Entity::find()
            .filter(payment_allocations::Column::InvoiceId.eq(invoice_id))
            .all(conn)
            .await?;

        Ok(rows.iter().map(|row| row.amount).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::next_sequence;

    #[test]
    fn test_next_sequence_continues_from_highest() {
        assert_eq!(next_sequence(None), 1);
        assert_eq!(next_sequence(Some("INV-20240105-0001")), 2);
        assert_eq!(next_sequence(Some("INV-20240105-0042")), 43);
    }

    #[test]
    fn test_next_sequence_survives_gaps_from_deletes() {
        // INV-20240105-0001 deleted, -0002 survives: the next number must
        // be 3, never a reissue of 2.
        assert_eq!(next_sequence(Some("INV-20240105-0002")), 3);
    }

    #[test]
    fn test_next_sequence_tolerates_malformed_numbers() {
        assert_eq!(next_sequence(Some("INV-20240105-")), 1);
        assert_eq!(next_sequence(Some("garbage")), 1);
    }
}
