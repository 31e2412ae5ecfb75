//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// Check service and database health
pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    sqlx::query("SELECT 1").execute(&state.db).await?;

    Ok(Json(HealthResponse {
        status: "ok",
        database: "ok",
    }))
}
