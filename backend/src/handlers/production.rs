//! HTTP handlers for production order endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::production::{
    ConsumptionRecord, CreateProductionOrderInput, ProductionOrderRecord, ProductionService,
};
use crate::AppState;

/// Create a production order
pub async fn create_production_order(
    State(state): State<AppState>,
    Json(input): Json<CreateProductionOrderInput>,
) -> AppResult<Json<ProductionOrderRecord>> {
    let service = ProductionService::new(state.db);
    let order = service.create_order(input).await?;
    Ok(Json(order))
}

/// List production orders
pub async fn list_production_orders(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductionOrderRecord>>> {
    let service = ProductionService::new(state.db);
    let orders = service.get_orders().await?;
    Ok(Json(orders))
}

/// Get a production order by ID
pub async fn get_production_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ProductionOrderRecord>> {
    let service = ProductionService::new(state.db);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// Get the consumption audit trail of a production order
pub async fn get_production_consumptions(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<ConsumptionRecord>>> {
    let service = ProductionService::new(state.db);
    let consumptions = service.get_consumptions(order_id).await?;
    Ok(Json(consumptions))
}

/// Complete a planned production order
pub async fn complete_production_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ProductionOrderRecord>> {
    let service = ProductionService::new(state.db);
    let order = service.complete_order(order_id).await?;
    Ok(Json(order))
}

/// Cancel a planned production order
pub async fn cancel_production_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ProductionOrderRecord>> {
    let service = ProductionService::new(state.db);
    let order = service.cancel_order(order_id).await?;
    Ok(Json(order))
}
