//! HTTP handlers for customer endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::customer::{
    CreateCustomerInput, CustomerRecord, CustomerService, UpdateCustomerInput,
};
use crate::AppState;

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CreateCustomerInput>,
) -> AppResult<Json<CustomerRecord>> {
    let service = CustomerService::new(state.db);
    let customer = service.create_customer(input).await?;
    Ok(Json(customer))
}

/// List customers
pub async fn list_customers(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CustomerRecord>>> {
    let service = CustomerService::new(state.db);
    let customers = service.get_customers().await?;
    Ok(Json(customers))
}

/// Get a customer by ID
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<CustomerRecord>> {
    let service = CustomerService::new(state.db);
    let customer = service.get_customer(customer_id).await?;
    Ok(Json(customer))
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<UpdateCustomerInput>,
) -> AppResult<Json<CustomerRecord>> {
    let service = CustomerService::new(state.db);
    let customer = service.update_customer(customer_id, input).await?;
    Ok(Json(customer))
}
