//! HTTP handlers for formula endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::formula::{CreateFormulaInput, FormulaService, FormulaWithIngredients};
use crate::AppState;

/// Create a formula with its ingredients
pub async fn create_formula(
    State(state): State<AppState>,
    Json(input): Json<CreateFormulaInput>,
) -> AppResult<Json<FormulaWithIngredients>> {
    let service = FormulaService::new(state.db);
    let formula = service.create_formula(input).await?;
    Ok(Json(formula))
}

/// List formulas with their ingredients
pub async fn list_formulas(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<FormulaWithIngredients>>> {
    let service = FormulaService::new(state.db);
    let formulas = service.get_formulas().await?;
    Ok(Json(formulas))
}

/// Get a formula with its ingredients
pub async fn get_formula(
    State(state): State<AppState>,
    Path(formula_id): Path<Uuid>,
) -> AppResult<Json<FormulaWithIngredients>> {
    let service = FormulaService::new(state.db);
    let formula = service.get_formula(formula_id).await?;
    Ok(Json(formula))
}
