//! Invoice management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use khata_db::{
    entities::{invoice_items, invoices, sea_orm_active_enums::InvoiceStatus},
    repositories::invoice::{
        CreateInvoiceInput, CreateInvoiceItemInput, InvoiceError, InvoiceFilter, InvoiceRepository,
        InvoiceWithItems,
    },
};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_invoice))
        .route("/invoices/{invoice_id}", get(get_invoice))
        .route("/invoices/{invoice_id}/items", put(replace_items))
        .route("/invoices/{invoice_id}/issue", post(issue_invoice))
        .route("/invoices/{invoice_id}", delete(delete_invoice))
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by status (draft, unpaid, partial, paid).
    pub status: Option<String>,
    /// Start date filter (inclusive, YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// End date filter (inclusive, YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

/// Request body for an invoice line item.
#[derive(Debug, Deserialize)]
pub struct InvoiceItemRequest {
    /// Product name.
    pub product_name: String,
    /// Optional SKU.
    pub sku: Option<String>,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Tax percentage for this line (default 0).
    #[serde(default)]
    pub tax_percent: Decimal,
}

impl InvoiceItemRequest {
    fn into_input(self) -> CreateInvoiceItemInput {
        CreateInvoiceItemInput {
            product_name: self.product_name,
            sku: self.sku,
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax_percent: self.tax_percent,
        }
    }
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Owning customer, if any.
    pub customer_id: Option<Uuid>,
    /// Invoice date (YYYY-MM-DD).
    pub date: NaiveDate,
    /// Line items.
    pub items: Vec<InvoiceItemRequest>,
    /// Invoice-level discount (default 0).
    #[serde(default)]
    pub discount: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Create as a draft with no financial effect (default false).
    #[serde(default)]
    pub draft: bool,
}

/// Request body for replacing an invoice's items.
#[derive(Debug, Deserialize)]
pub struct ReplaceItemsRequest {
    /// New line items.
    pub items: Vec<InvoiceItemRequest>,
    /// New invoice-level discount (default 0).
    #[serde(default)]
    pub discount: Decimal,
}

/// Response for an invoice line item.
#[derive(Debug, Serialize)]
pub struct InvoiceItemResponse {
    /// Item ID.
    pub id: Uuid,
    /// Product name.
    pub product_name: String,
    /// SKU.
    pub sku: Option<String>,
    /// Quantity.
    pub quantity: String,
    /// Unit price.
    pub unit_price: String,
    /// Tax percentage.
    pub tax_percent: String,
}

impl From<invoice_items::Model> for InvoiceItemResponse {
    fn from(model: invoice_items::Model) -> Self {
        Self {
            id: model.id,
            product_name: model.product_name,
            sku: model.sku,
            quantity: model.quantity.to_string(),
            unit_price: model.unit_price.to_string(),
            tax_percent: model.tax_percent.to_string(),
        }
    }
}

/// Response for an invoice header.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// Owning customer.
    pub customer_id: Option<Uuid>,
    /// Generated invoice number.
    pub invoice_no: String,
    /// Invoice date.
    pub date: NaiveDate,
    /// Status.
    pub status: String,
    /// Sum of line totals.
    pub subtotal: String,
    /// Sum of line taxes.
    pub tax: String,
    /// Invoice-level discount.
    pub discount: String,
    /// Grand total.
    pub total: String,
    /// Notes.
    pub notes: Option<String>,
}

impl From<invoices::Model> for InvoiceResponse {
    fn from(model: invoices::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            invoice_no: model.invoice_no,
            date: model.date,
            status: model.status.to_value(),
            subtotal: model.subtotal.to_string(),
            tax: model.tax.to_string(),
            discount: model.discount.to_string(),
            total: model.total.to_string(),
            notes: model.notes,
        }
    }
}

fn invoice_with_items_json(result: InvoiceWithItems) -> serde_json::Value {
    let items: Vec<InvoiceItemResponse> = result
        .items
        .into_iter()
        .map(InvoiceItemResponse::from)
        .collect();
    json!({
        "invoice": InvoiceResponse::from(result.invoice),
        "items": items
    })
}

/// GET `/invoices` - List invoices.
async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match parse_status(raw) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Invalid status. Must be one of: draft, unpaid, partial, paid"
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = InvoiceRepository::new((*state.db).clone());
    let filter = InvoiceFilter {
        customer_id: query.customer_id,
        status,
        date_from: query.from,
        date_to: query.to,
    };

    match repo.list(filter).await {
        Ok(invoices) => {
            let response: Vec<InvoiceResponse> =
                invoices.into_iter().map(InvoiceResponse::from).collect();
            (StatusCode::OK, Json(json!({ "invoices": response }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices` - Create an invoice with items.
async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let input = CreateInvoiceInput {
        customer_id: payload.customer_id,
        date: payload.date,
        items: payload
            .items
            .into_iter()
            .map(InvoiceItemRequest::into_input)
            .collect(),
        discount: payload.discount,
        notes: payload.notes,
        draft: payload.draft,
    };

    match repo.create(input).await {
        Ok(result) => (StatusCode::CREATED, Json(invoice_with_items_json(result))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/invoices/{invoice_id}` - Get an invoice with its items.
async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.find_with_items(invoice_id).await {
        Ok(result) => (StatusCode::OK, Json(invoice_with_items_json(result))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/invoices/{invoice_id}/items` - Replace an invoice's items.
async fn replace_items(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<ReplaceItemsRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let items = payload
        .items
        .into_iter()
        .map(InvoiceItemRequest::into_input)
        .collect();

    match repo.replace_items(invoice_id, items, payload.discount).await {
        Ok(result) => (StatusCode::OK, Json(invoice_with_items_json(result))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices/{invoice_id}/issue` - Issue a draft invoice.
async fn issue_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.issue(invoice_id).await {
        Ok(invoice) => (
            StatusCode::OK,
            Json(json!({ "invoice": InvoiceResponse::from(invoice) })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE `/invoices/{invoice_id}` - Delete an invoice.
async fn delete_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.delete(invoice_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

fn parse_status(raw: &str) -> Option<InvoiceStatus> {
    match raw {
        "draft" => Some(InvoiceStatus::Draft),
        "unpaid" => Some(InvoiceStatus::Unpaid),
        "partial" => Some(InvoiceStatus::Partial),
        "paid" => Some(InvoiceStatus::Paid),
        _ => None,
    }
}

/// Maps repository errors to HTTP responses.
fn error_response(error: &InvoiceError) -> Response {
    match error {
        InvoiceError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "invoice_not_found",
                "message": format!("Invoice not found: {id}")
            })),
        )
            .into_response(),
        InvoiceError::HasAllocations(id) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "invoice_has_allocations",
                "message": format!("Invoice {id} has payment allocations, unapply them first")
            })),
        )
            .into_response(),
        InvoiceError::AlreadyIssued(id) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "invoice_already_issued",
                "message": format!("Invoice {id} is already issued")
            })),
        )
            .into_response(),
        InvoiceError::Database(e) => {
            error!(error = %e, "Invoice database operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("draft", Some(InvoiceStatus::Draft))]
    #[case("unpaid", Some(InvoiceStatus::Unpaid))]
    #[case("partial", Some(InvoiceStatus::Partial))]
    #[case("paid", Some(InvoiceStatus::Paid))]
    #[case("void", None)]
    #[case("", None)]
    fn test_parse_status(#[case] raw: &str, #[case] expected: Option<InvoiceStatus>) {
        assert_eq!(parse_status(raw), expected);
    }
}
