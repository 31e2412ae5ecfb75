//! HTTP handlers for product endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::product::{
    CreateProductInput, ProductRecord, ProductService, UpdateProductInput,
};
use crate::AppState;

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// List products
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<ProductRecord>>> {
    let service = ProductService::new(state.db);
    let products = service.get_products().await?;
    Ok(Json(products))
}

/// Get a product by ID
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Update a product definition
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<ProductRecord>> {
    let service = ProductService::new(state.db);
    let product = service.update_product(product_id, input).await?;
    Ok(Json(product))
}
