//! HTTP handlers for raw-material (chemical) endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::chemical::{
    ChemicalService, ChemicalSummary, CreateChemicalInput, ReconcileResult, UpdateChemicalInput,
};
use crate::AppState;

/// Create a chemical
pub async fn create_chemical(
    State(state): State<AppState>,
    Json(input): Json<CreateChemicalInput>,
) -> AppResult<Json<ChemicalSummary>> {
    let service = ChemicalService::new(state.db);
    let chemical = service.create_chemical(input).await?;
    Ok(Json(chemical))
}

/// List chemicals with derived average costs
pub async fn list_chemicals(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ChemicalSummary>>> {
    let service = ChemicalService::new(state.db);
    let chemicals = service.get_chemicals().await?;
    Ok(Json(chemicals))
}

/// Get a chemical by ID
pub async fn get_chemical(
    State(state): State<AppState>,
    Path(chemical_id): Path<Uuid>,
) -> AppResult<Json<ChemicalSummary>> {
    let service = ChemicalService::new(state.db);
    let chemical = service.get_chemical(chemical_id).await?;
    Ok(Json(chemical))
}

/// Update a chemical
pub async fn update_chemical(
    State(state): State<AppState>,
    Path(chemical_id): Path<Uuid>,
    Json(input): Json<UpdateChemicalInput>,
) -> AppResult<Json<ChemicalSummary>> {
    let service = ChemicalService::new(state.db);
    let chemical = service.update_chemical(chemical_id, input).await?;
    Ok(Json(chemical))
}

/// List chemicals at or below their reorder threshold
pub async fn list_low_stock(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ChemicalSummary>>> {
    let service = ChemicalService::new(state.db);
    let chemicals = service.get_low_stock().await?;
    Ok(Json(chemicals))
}

/// Reconcile the cached stock aggregate against the batch table
pub async fn reconcile_chemical_stock(
    State(state): State<AppState>,
    Path(chemical_id): Path<Uuid>,
) -> AppResult<Json<ReconcileResult>> {
    let service = ChemicalService::new(state.db);
    let result = service.reconcile_stock(chemical_id).await?;
    Ok(Json(result))
}
