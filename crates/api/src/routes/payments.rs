//! Payment management routes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use khata_core::allocation::AllocationRequest;
use khata_core::payment::PaymentMethod;
use khata_db::{
    entities::{payment_allocations, payments},
    repositories::payment::{
        CreatePaymentInput, PaymentError, PaymentFilter, PaymentRepository, PaymentWithAllocations,
    },
};
use khata_shared::types::InvoiceId;

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments))
        .route("/payments", post(create_payment))
        .route("/payments/{payment_id}", get(get_payment))
        .route("/payments/{payment_id}/allocations", put(replace_allocations))
        .route("/payments/{payment_id}", delete(delete_payment))
}

/// Query parameters for listing payments.
#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Start date filter (inclusive, YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// End date filter (inclusive, YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

/// Request body for one allocation.
#[derive(Debug, Deserialize)]
pub struct AllocationRequestBody {
    /// Target invoice.
    pub invoice_id: Uuid,
    /// Amount to apply.
    pub amount: Decimal,
}

impl AllocationRequestBody {
    fn into_request(self) -> AllocationRequest {
        AllocationRequest {
            invoice_id: InvoiceId::from_uuid(self.invoice_id),
            amount: self.amount,
        }
    }
}

/// Request body for creating a payment.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// Paying customer.
    pub customer_id: Uuid,
    /// Payment amount (positive).
    pub amount: Decimal,
    /// Payment method: cash, card, upi, bank_transfer, cheque.
    pub method: String,
    /// Payment date (YYYY-MM-DD).
    pub date: NaiveDate,
    /// External reference.
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Optional immediate allocation against invoices.
    #[serde(default)]
    pub allocations: Vec<AllocationRequestBody>,
}

/// Request body for replacing a payment's allocations.
#[derive(Debug, Deserialize)]
pub struct ReplaceAllocationsRequest {
    /// New allocation distribution.
    pub allocations: Vec<AllocationRequestBody>,
}

/// Response for an allocation row.
#[derive(Debug, Serialize)]
pub struct AllocationResponse {
    /// Allocation ID.
    pub id: Uuid,
    /// Target invoice.
    pub invoice_id: Uuid,
    /// Allocated amount.
    pub amount: String,
}

impl From<payment_allocations::Model> for AllocationResponse {
    fn from(model: payment_allocations::Model) -> Self {
        Self {
            id: model.id,
            invoice_id: model.invoice_id,
            amount: model.amount.to_string(),
        }
    }
}

/// Response for a payment header.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Paying customer.
    pub customer_id: Uuid,
    /// Payment amount.
    pub amount: String,
    /// Payment method.
    pub method: String,
    /// Payment date.
    pub date: NaiveDate,
    /// External reference.
    pub reference: Option<String>,
    /// Notes.
    pub notes: Option<String>,
}

impl From<payments::Model> for PaymentResponse {
    fn from(model: payments::Model) -> Self {
        let method: PaymentMethod = model.method.into();
        Self {
            id: model.id,
            customer_id: model.customer_id,
            amount: model.amount.to_string(),
            method: method.to_string(),
            date: model.date,
            reference: model.reference,
            notes: model.notes,
        }
    }
}

fn payment_with_allocations_json(result: PaymentWithAllocations) -> serde_json::Value {
    let allocations: Vec<AllocationResponse> = result
        .allocations
        .into_iter()
        .map(AllocationResponse::from)
        .collect();
    json!({
        "payment": PaymentResponse::from(result.payment),
        "allocations": allocations
    })
}

/// GET `/payments` - List payments.
async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListPaymentsQuery>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());
    let filter = PaymentFilter {
        customer_id: query.customer_id,
        date_from: query.from,
        date_to: query.to,
    };

    match repo.list(filter).await {
        Ok(payments) => {
            let response: Vec<PaymentResponse> =
                payments.into_iter().map(PaymentResponse::from).collect();
            (StatusCode::OK, Json(json!({ "payments": response }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/payments` - Record a payment, optionally allocating it.
async fn create_payment(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    let Ok(method) = PaymentMethod::from_str(&payload.method) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_method",
                "message": "Invalid method. Must be one of: cash, card, upi, bank_transfer, cheque"
            })),
        )
            .into_response();
    };

    if payload.amount <= Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Payment amount must be positive"
            })),
        )
            .into_response();
    }

    let repo = PaymentRepository::new((*state.db).clone());
    let input = CreatePaymentInput {
        customer_id: payload.customer_id,
        amount: payload.amount,
        method: method.into(),
        date: payload.date,
        reference: payload.reference,
        notes: payload.notes,
        allocations: payload
            .allocations
            .into_iter()
            .map(AllocationRequestBody::into_request)
            .collect(),
    };

    match repo.create(input).await {
        Ok(result) => {
            (StatusCode::CREATED, Json(payment_with_allocations_json(result))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/payments/{payment_id}` - Get a payment with its allocations.
async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());

    match repo.find_with_allocations(payment_id).await {
        Ok(result) => (StatusCode::OK, Json(payment_with_allocations_json(result))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/payments/{payment_id}/allocations` - Replace a payment's
/// allocations.
async fn replace_allocations(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<ReplaceAllocationsRequest>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());
    let requests: Vec<AllocationRequest> = payload
        .allocations
        .into_iter()
        .map(AllocationRequestBody::into_request)
        .collect();

    match repo.apply_allocations(payment_id, &requests).await {
        Ok(result) => (StatusCode::OK, Json(payment_with_allocations_json(result))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE `/payments/{payment_id}` - Delete a payment.
async fn delete_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());

    match repo.delete(payment_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// Maps repository errors to HTTP responses.
fn error_response(error: &PaymentError) -> Response {
    match error {
        PaymentError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "payment_not_found",
                "message": format!("Payment not found: {id}")
            })),
        )
            .into_response(),
        PaymentError::InvoiceNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "invoice_not_found",
                "message": format!("Invoice not found: {id}")
            })),
        )
            .into_response(),
        PaymentError::InvoiceCustomerMismatch {
            invoice_id,
            customer_id,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "customer_mismatch",
                "message": format!(
                    "Invoice {invoice_id} does not belong to customer {customer_id}"
                )
            })),
        )
            .into_response(),
        PaymentError::Allocation(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": e.error_code(),
                "message": e.to_string()
            })),
        )
            .into_response(),
        PaymentError::Database(e) => {
            error!(error = %e, "Payment database operation failed");
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
