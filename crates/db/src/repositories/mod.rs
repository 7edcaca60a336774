//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod customer;
pub mod invoice;
pub mod ledger;
pub mod payment;

pub use customer::{CreateCustomerInput, CustomerError, CustomerRepository, UpdateCustomerInput};
pub use invoice::{
    CreateInvoiceInput, CreateInvoiceItemInput, InvoiceError, InvoiceFilter, InvoiceRepository,
    InvoiceWithItems,
};
pub use ledger::{LedgerQueryError, LedgerRepository, Statement};
pub use payment::{
    CreatePaymentInput, PaymentError, PaymentFilter, PaymentRepository, PaymentWithAllocations,
};
