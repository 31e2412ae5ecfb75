//! HTTP handlers for purchase order endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::procurement::{
    CreatePurchaseOrderInput, PurchaseOrderRecord, PurchaseOrderService, PurchaseOrderWithLines,
    ReceivePurchaseOrderInput,
};
use crate::AppState;

/// Create a purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(input): Json<CreatePurchaseOrderInput>,
) -> AppResult<Json<PurchaseOrderWithLines>> {
    let service = PurchaseOrderService::new(state.db, state.lot_codes.clone());
    let order = service.create_order(input).await?;
    Ok(Json(order))
}

/// List purchase orders
pub async fn list_purchase_orders(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PurchaseOrderRecord>>> {
    let service = PurchaseOrderService::new(state.db, state.lot_codes.clone());
    let orders = service.get_orders().await?;
    Ok(Json(orders))
}

/// Get a purchase order with its lines
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrderWithLines>> {
    let service = PurchaseOrderService::new(state.db, state.lot_codes.clone());
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// Receive a pending purchase order, creating its batches
pub async fn receive_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ReceivePurchaseOrderInput>,
) -> AppResult<Json<PurchaseOrderWithLines>> {
    let service = PurchaseOrderService::new(state.db, state.lot_codes.clone());
    let order = service.receive_order(order_id, input).await?;
    Ok(Json(order))
}

/// Cancel a pending purchase order
pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrderWithLines>> {
    let service = PurchaseOrderService::new(state.db, state.lot_codes.clone());
    let order = service.cancel_order(order_id).await?;
    Ok(Json(order))
}
