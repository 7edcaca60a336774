//! Customer repository for database operations.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use khata_core::customer::customer_code;

use crate::entities::customers;

/// Error types for customer operations.
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// Customer not found or already deleted.
    #[error("Customer not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerInput {
    /// Display name.
    pub name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// GST/VAT registration number.
    pub gst_vat: Option<String>,
    /// Credit limit.
    pub credit_limit: Option<Decimal>,
}

/// Input for updating a customer. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerInput {
    /// New display name.
    pub name: Option<String>,
    /// New phone number.
    pub phone: Option<Option<String>>,
    /// New email address.
    pub email: Option<Option<String>>,
    /// New postal address.
    pub address: Option<Option<String>>,
    /// New GST/VAT registration number.
    pub gst_vat: Option<Option<String>>,
    /// New credit limit.
    pub credit_limit: Option<Option<Decimal>>,
}

/// Customer repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a customer with a generated `CUST-NNNN` code.
    ///
    /// The sequence counts every customer ever created, deleted ones
    /// included, so codes are never reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreateCustomerInput) -> Result<customers::Model, CustomerError> {
        let sequence = customers::Entity::find().count(&self.db).await?;
        let sequence = u32::try_from(sequence).unwrap_or(u32::MAX).saturating_add(1);

        let now = Utc::now().into();
        let customer = customers::ActiveModel {
            id: Set(Uuid::now_v7()),
            customer_code: Set(customer_code(sequence)),
            name: Set(input.name),
            phone: Set(input.phone),
            email: Set(input.email),
            address: Set(input.address),
            gst_vat: Set(input.gst_vat),
            credit_limit: Set(input.credit_limit),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let customer = customer.insert(&self.db).await?;
        info!(
            customer_id = %customer.id,
            customer_code = %customer.customer_code,
            "Created customer"
        );

        Ok(customer)
    }

    /// Finds an active customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or soft-deleted customers.
    pub async fn find_by_id(&self, id: Uuid) -> Result<customers::Model, CustomerError> {
        customers::Entity::find_by_id(id)
            .filter(customers::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(CustomerError::NotFound(id))
    }

    /// Lists active customers ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<customers::Model>, CustomerError> {
        Ok(customers::Entity::find()
            .filter(customers::Column::DeletedAt.is_null())
            .order_by_asc(customers::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Updates an active customer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or soft-deleted customers.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        let customer = self.find_by_id(id).await?;

        let mut active: customers::ActiveModel = customer.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(gst_vat) = input.gst_vat {
            active.gst_vat = Set(gst_vat);
        }
        if let Some(credit_limit) = input.credit_limit {
            active.credit_limit = Set(credit_limit);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Soft-deletes a customer by setting `deleted_at`.
    ///
    /// History (invoices, payments) is kept; the customer simply stops
    /// appearing in lists, ledgers, and balance sweeps.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or already-deleted customers.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), CustomerError> {
        let customer = self.find_by_id(id).await?;

        let now = Utc::now().into();
        let mut active: customers::ActiveModel = customer.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;
        info!(customer_id = %id, "Soft-deleted customer");

        Ok(())
    }
}
