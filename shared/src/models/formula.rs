//! Formula (recipe) models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A manufacturing recipe
///
/// Ingredient quantities are denominated per one `standard_yield` unit of
/// output, so a production order for N units consumes
/// `quantity_required x N` of each ingredient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formula {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub standard_yield: Decimal,
    /// The finished product this formula produces, if linked
    pub product_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One ingredient of a formula
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaIngredient {
    pub id: Uuid,
    pub formula_id: Uuid,
    pub chemical_id: Uuid,
    /// Quantity required per one yield unit of output; always positive
    pub quantity_required: Decimal,
}

/// Ingredient quantity needed for a production run of `quantity_planned`
/// yield units
pub fn scale_requirement(quantity_required: Decimal, quantity_planned: i32) -> Decimal {
    quantity_required * Decimal::from(quantity_planned)
}
