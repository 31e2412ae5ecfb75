//! HTTP handlers for supplier endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::supplier::{
    CreateSupplierInput, SupplierRecord, SupplierService, UpdateSupplierInput,
};
use crate::AppState;

/// Create a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<Json<SupplierRecord>> {
    let service = SupplierService::new(state.db);
    let supplier = service.create_supplier(input).await?;
    Ok(Json(supplier))
}

/// List suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SupplierRecord>>> {
    let service = SupplierService::new(state.db);
    let suppliers = service.get_suppliers().await?;
    Ok(Json(suppliers))
}

/// Get a supplier by ID
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<SupplierRecord>> {
    let service = SupplierService::new(state.db);
    let supplier = service.get_supplier(supplier_id).await?;
    Ok(Json(supplier))
}

/// Update a supplier
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<UpdateSupplierInput>,
) -> AppResult<Json<SupplierRecord>> {
    let service = SupplierService::new(state.db);
    let supplier = service.update_supplier(supplier_id, input).await?;
    Ok(Json(supplier))
}
