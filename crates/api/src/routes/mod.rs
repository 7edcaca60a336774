//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod customers;
pub mod health;
pub mod invoices;
pub mod ledger;
pub mod payments;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(customers::routes())
        .merge(invoices::routes())
        .merge(payments::routes())
        .merge(ledger::routes())
}
