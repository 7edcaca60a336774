//! `SeaORM` entity definitions.

pub mod customers;
pub mod invoice_items;
pub mod invoices;
pub mod payment_allocations;
pub mod payments;
pub mod sea_orm_active_enums;
