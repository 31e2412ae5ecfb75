//! HTTP handlers for sales endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::sales::{
    ProcessSaleInput, SalesService, TransactionRecord, TransactionWithDetails,
};
use crate::AppState;

/// Process a sale
pub async fn process_sale(
    State(state): State<AppState>,
    Json(input): Json<ProcessSaleInput>,
) -> AppResult<Json<TransactionWithDetails>> {
    let service = SalesService::new(state.db, state.invoice_codes.clone());
    let transaction = service.process_sale(input).await?;
    Ok(Json(transaction))
}

/// List transactions
pub async fn list_sales(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TransactionRecord>>> {
    let service = SalesService::new(state.db, state.invoice_codes.clone());
    let transactions = service.get_sales().await?;
    Ok(Json(transactions))
}

/// Get a transaction with its lines and payments
pub async fn get_sale(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<TransactionWithDetails>> {
    let service = SalesService::new(state.db, state.invoice_codes.clone());
    let transaction = service.get_sale(transaction_id).await?;
    Ok(Json(transaction))
}

/// Void a completed sale with a compensating reversal
pub async fn void_sale(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<TransactionWithDetails>> {
    let service = SalesService::new(state.db, state.invoice_codes.clone());
    let reversal = service.void_sale(transaction_id).await?;
    Ok(Json(reversal))
}
