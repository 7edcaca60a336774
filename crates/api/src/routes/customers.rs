//! Customer management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use khata_db::{
    entities::customers,
    repositories::customer::{
        CreateCustomerInput, CustomerError, CustomerRepository, UpdateCustomerInput,
    },
};

/// Creates the customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers))
        .route("/customers", post(create_customer))
        .route("/customers/{customer_id}", get(get_customer))
        .route("/customers/{customer_id}", put(update_customer))
        .route("/customers/{customer_id}", delete(delete_customer))
}

/// Request body for creating a customer.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
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

/// Request body for updating a customer. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCustomerRequest {
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

/// Response for a customer.
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    /// Customer ID.
    pub id: Uuid,
    /// Generated customer code.
    pub customer_code: String,
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
    pub credit_limit: Option<String>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

impl From<customers::Model> for CustomerResponse {
    fn from(model: customers::Model) -> Self {
        Self {
            id: model.id,
            customer_code: model.customer_code,
            name: model.name,
            phone: model.phone,
            email: model.email,
            address: model.address,
            gst_vat: model.gst_vat,
            credit_limit: model.credit_limit.map(|limit| limit.to_string()),
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// GET `/customers` - List active customers.
async fn list_customers(State(state): State<AppState>) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());

    match repo.list().await {
        Ok(customers) => {
            let response: Vec<CustomerResponse> =
                customers.into_iter().map(CustomerResponse::from).collect();
            (StatusCode::OK, Json(json!({ "customers": response }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/customers` - Create a customer.
async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_name",
                "message": "Customer name must not be empty"
            })),
        )
            .into_response();
    }

    let repo = CustomerRepository::new((*state.db).clone());
    let input = CreateCustomerInput {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        address: payload.address,
        gst_vat: payload.gst_vat,
        credit_limit: payload.credit_limit,
    };

    match repo.create(input).await {
        Ok(customer) => (
            StatusCode::CREATED,
            Json(json!({ "customer": CustomerResponse::from(customer) })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/customers/{customer_id}` - Get a customer.
async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());

    match repo.find_by_id(customer_id).await {
        Ok(customer) => (
            StatusCode::OK,
            Json(json!({ "customer": CustomerResponse::from(customer) })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/customers/{customer_id}` - Update a customer.
async fn update_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());
    let input = UpdateCustomerInput {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        address: payload.address,
        gst_vat: payload.gst_vat,
        credit_limit: payload.credit_limit,
    };

    match repo.update(customer_id, input).await {
        Ok(customer) => (
            StatusCode::OK,
            Json(json!({ "customer": CustomerResponse::from(customer) })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE `/customers/{customer_id}` - Soft-delete a customer.
async fn delete_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());

    match repo.soft_delete(customer_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// Maps repository errors to HTTP responses.
fn error_response(error: &CustomerError) -> Response {
    match error {
        CustomerError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "customer_not_found",
                "message": format!("Customer not found: {id}")
            })),
        )
            .into_response(),
        CustomerError::Database(e) => {
            error!(error = %e, "Customer database operation failed");
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
