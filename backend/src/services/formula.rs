//! Formula (recipe) management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::validate_positive_quantity;

/// Formula service for recipes and their ingredient lists
#[derive(Clone)]
pub struct FormulaService {
    db: PgPool,
}

/// Formula header record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FormulaRecord {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub standard_yield: Decimal,
    pub product_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ingredient record with the chemical name for display
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FormulaIngredientRecord {
    pub id: Uuid,
    pub formula_id: Uuid,
    pub chemical_id: Uuid,
    pub chemical_name: String,
    pub quantity_required: Decimal,
}

/// Formula with its ingredients
#[derive(Debug, Clone, Serialize)]
pub struct FormulaWithIngredients {
    #[serde(flatten)]
    pub formula: FormulaRecord,
    pub ingredients: Vec<FormulaIngredientRecord>,
}

/// Ingredient input for creating a formula
#[derive(Debug, Deserialize)]
pub struct IngredientInput {
    pub chemical_id: Uuid,
    /// Required per one yield unit of output
    pub quantity_required: Decimal,
}

/// Input for creating a formula
#[derive(Debug, Deserialize)]
pub struct CreateFormulaInput {
    pub name: String,
    pub code: String,
    pub standard_yield: Option<Decimal>,
    pub product_id: Option<Uuid>,
    pub ingredients: Vec<IngredientInput>,
}

const FORMULA_COLUMNS: &str =
    "id, name, code, standard_yield, product_id, created_at, updated_at";

impl FormulaService {
    /// Create a new FormulaService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a formula with its ingredient list
    pub async fn create_formula(
        &self,
        input: CreateFormulaInput,
    ) -> AppResult<FormulaWithIngredients> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Formula name cannot be empty".to_string(),
                message_th: "ชื่อสูตรไม่สามารถว่างได้".to_string(),
            });
        }
        if input.code.trim().is_empty() {
            return Err(AppError::Validation {
                field: "code".to_string(),
                message: "Formula code cannot be empty".to_string(),
                message_th: "รหัสสูตรไม่สามารถว่างได้".to_string(),
            });
        }
        if input.ingredients.is_empty() {
            return Err(AppError::InvalidFormula(
                "A formula needs at least one ingredient".to_string(),
            ));
        }

        let standard_yield = input.standard_yield.unwrap_or(Decimal::ONE);
        if validate_positive_quantity(standard_yield).is_err() {
            return Err(AppError::Validation {
                field: "standard_yield".to_string(),
                message: "Standard yield must be positive".to_string(),
                message_th: "ผลผลิตมาตรฐานต้องเป็นค่าบวก".to_string(),
            });
        }

        for ingredient in &input.ingredients {
            if validate_positive_quantity(ingredient.quantity_required).is_err() {
                return Err(AppError::Validation {
                    field: "quantity_required".to_string(),
                    message: "Ingredient quantity must be positive".to_string(),
                    message_th: "ปริมาณส่วนผสมต้องเป็นค่าบวก".to_string(),
                });
            }

            let chemical_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM chemicals WHERE id = $1)",
            )
            .bind(ingredient.chemical_id)
            .fetch_one(&self.db)
            .await?;
            if !chemical_exists {
                return Err(AppError::NotFound(format!(
                    "Chemical {}",
                    ingredient.chemical_id
                )));
            }
        }

        if let Some(product_id) = input.product_id {
            let product_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
            )
            .bind(product_id)
            .fetch_one(&self.db)
            .await?;
            if !product_exists {
                return Err(AppError::NotFound("Product".to_string()));
            }
        }

        let mut tx = self.db.begin().await?;

        let formula_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO formulas (name, code, standard_yield, product_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.code.trim())
        .bind(standard_yield)
        .bind(input.product_id)
        .fetch_one(&mut *tx)
        .await?;

        for ingredient in &input.ingredients {
            sqlx::query(
                r#"
                INSERT INTO formula_ingredients (formula_id, chemical_id, quantity_required)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(formula_id)
            .bind(ingredient.chemical_id)
            .bind(ingredient.quantity_required)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_formula(formula_id).await
    }

    /// Get a formula with its ingredients
    pub async fn get_formula(&self, formula_id: Uuid) -> AppResult<FormulaWithIngredients> {
        let formula = sqlx::query_as::<_, FormulaRecord>(&format!(
            "SELECT {} FROM formulas WHERE id = $1",
            FORMULA_COLUMNS
        ))
        .bind(formula_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Formula".to_string()))?;

        let ingredients = self.get_ingredients(formula_id).await?;

        Ok(FormulaWithIngredients {
            formula,
            ingredients,
        })
    }

    /// List all formulas with their ingredients
    pub async fn get_formulas(&self) -> AppResult<Vec<FormulaWithIngredients>> {
        let formulas = sqlx::query_as::<_, FormulaRecord>(&format!(
            "SELECT {} FROM formulas ORDER BY name",
            FORMULA_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let mut result = Vec::with_capacity(formulas.len());
        for formula in formulas {
            let ingredients = self.get_ingredients(formula.id).await?;
            result.push(FormulaWithIngredients {
                formula,
                ingredients,
            });
        }

        Ok(result)
    }

    async fn get_ingredients(&self, formula_id: Uuid) -> AppResult<Vec<FormulaIngredientRecord>> {
        let ingredients = sqlx::query_as::<_, FormulaIngredientRecord>(
            r#"
            SELECT fi.id, fi.formula_id, fi.chemical_id, c.name AS chemical_name,
                   fi.quantity_required
            FROM formula_ingredients fi
            JOIN chemicals c ON c.id = fi.chemical_id
            WHERE fi.formula_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(formula_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ingredients)
    }
}
