//! HTTP handlers for batch (receipt lot) endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::batch::{BatchRecord, BatchService};
use crate::AppState;

/// Query parameters for the batch listing
#[derive(Debug, Deserialize)]
pub struct BatchListQuery {
    pub chemical_id: Option<Uuid>,
}

/// List batches in receipt order, optionally for one chemical
pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<BatchListQuery>,
) -> AppResult<Json<Vec<BatchRecord>>> {
    let service = BatchService::new(state.db);
    let batches = service.get_batches(query.chemical_id).await?;
    Ok(Json(batches))
}

/// Get a batch by ID
pub async fn get_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<BatchRecord>> {
    let service = BatchService::new(state.db);
    let batch = service.get_batch(batch_id).await?;
    Ok(Json(batch))
}

/// Look up a batch by its lot code
pub async fn get_batch_by_lot_code(
    State(state): State<AppState>,
    Path(lot_code): Path<String>,
) -> AppResult<Json<BatchRecord>> {
    let service = BatchService::new(state.db);
    let batch = service.get_batch_by_lot_code(&lot_code).await?;
    Ok(Json(batch))
}

/// Quarantine an active batch
pub async fn quarantine_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<BatchRecord>> {
    let service = BatchService::new(state.db);
    let batch = service.quarantine_batch(batch_id).await?;
    Ok(Json(batch))
}

/// Release a quarantined batch
pub async fn release_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<BatchRecord>> {
    let service = BatchService::new(state.db);
    let batch = service.release_batch(batch_id).await?;
    Ok(Json(batch))
}

/// Mark a batch as expired
pub async fn expire_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<BatchRecord>> {
    let service = BatchService::new(state.db);
    let batch = service.mark_expired(batch_id).await?;
    Ok(Json(batch))
}
