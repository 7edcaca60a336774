//! Ledger, balance, and statement routes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use khata_core::ledger::{
    CustomerBalance, EntryKind, InvoiceScope, Ledger, LedgerEntry, LedgerOptions,
};
use khata_db::repositories::ledger::{LedgerQueryError, LedgerRepository};

/// Creates the ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers/{customer_id}/ledger", get(get_ledger))
        .route("/customers/{customer_id}/balance", get(get_balance))
        .route("/customers/{customer_id}/statement", get(get_statement))
        .route("/balances", get(get_all_balances))
}

/// Query parameters for the ledger view.
#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// Start date filter (inclusive, YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// End date filter (inclusive, YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Balance carried in from before the window (default 0).
    pub opening_balance: Option<Decimal>,
    /// Invoice scope: all (default) or outstanding_only.
    pub scope: Option<String>,
}

/// Response for one ledger line.
#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    /// Source invoice or payment ID.
    pub id: Uuid,
    /// Entry date.
    pub date: NaiveDate,
    /// Entry kind: invoice or payment.
    pub kind: &'static str,
    /// Description.
    pub description: String,
    /// External reference.
    pub reference: Option<String>,
    /// Debit amount.
    pub debit: String,
    /// Credit amount.
    pub credit: String,
    /// Running balance after this entry.
    pub balance: String,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            kind: match entry.kind {
                EntryKind::Invoice => "invoice",
                EntryKind::Payment => "payment",
            },
            description: entry.description,
            reference: entry.reference,
            debit: entry.debit.to_string(),
            credit: entry.credit.to_string(),
            balance: entry.balance.to_string(),
        }
    }
}

fn ledger_json(ledger: Ledger) -> serde_json::Value {
    let entries: Vec<LedgerEntryResponse> = ledger
        .entries
        .into_iter()
        .map(LedgerEntryResponse::from)
        .collect();
    json!({
        "opening_balance": ledger.opening_balance.to_string(),
        "closing_balance": ledger.closing_balance.to_string(),
        "entries": entries
    })
}

/// Response for one ranked balance.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Customer ID.
    pub customer_id: Uuid,
    /// Customer code.
    pub customer_code: String,
    /// Customer name.
    pub customer_name: String,
    /// Balance. Positive = customer owes.
    pub balance: String,
}

impl From<CustomerBalance> for BalanceResponse {
    fn from(balance: CustomerBalance) -> Self {
        Self {
            customer_id: balance.customer_id.into_inner(),
            customer_code: balance.customer_code,
            customer_name: balance.customer_name,
            balance: balance.balance.to_string(),
        }
    }
}

/// GET `/customers/{customer_id}/ledger` - Reconstruct a customer's
/// ledger with running balances.
async fn get_ledger(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Query(query): Query<LedgerQuery>,
) -> impl IntoResponse {
    let scope = match query.scope.as_deref() {
        None => InvoiceScope::default(),
        Some(raw) => match InvoiceScope::from_str(raw) {
            Ok(scope) => scope,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_scope",
                        "message": "Invalid scope. Must be one of: all, outstanding_only"
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = LedgerRepository::new((*state.db).clone());
    let options = LedgerOptions {
        opening_balance: query.opening_balance.unwrap_or_default(),
        date_from: query.from,
        date_to: query.to,
        scope,
    };

    match repo.build_ledger(customer_id, options).await {
        Ok(ledger) => (StatusCode::OK, Json(ledger_json(ledger))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/customers/{customer_id}/balance` - Aggregate balance,
/// cross-checked against the itemized ledger.
async fn get_balance(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.get_balance(customer_id).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({ "balance": balance.to_string() })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/customers/{customer_id}/statement` - Full-history statement
/// with a share link.
async fn get_statement(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.statement(customer_id).await {
        Ok(statement) => (
            StatusCode::OK,
            Json(json!({
                "message": statement.message,
                "share_url": statement.share_url
            })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/balances` - Every active customer's non-zero balance, ranked
/// by absolute magnitude.
async fn get_all_balances(State(state): State<AppState>) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.get_all_balances().await {
        Ok(balances) => {
            let response: Vec<BalanceResponse> =
                balances.into_iter().map(BalanceResponse::from).collect();
            (StatusCode::OK, Json(json!({ "balances": response }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Maps ledger query errors to HTTP responses.
fn error_response(error: &LedgerQueryError) -> Response {
    match error {
        LedgerQueryError::CustomerNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "customer_not_found",
                "message": format!("Customer not found: {id}")
            })),
        )
            .into_response(),
        LedgerQueryError::Ledger(e) => {
            error!(error = %e, "Ledger reconstruction failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": e.error_code(),
                    "message": e.to_string()
                })),
            )
                .into_response()
        }
        LedgerQueryError::Database(e) => {
            error!(error = %e, "Ledger database query failed");
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
