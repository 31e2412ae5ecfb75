//! Production service for manufacturing runs
//!
//! Completing an order is the engine's hot path: ingredient requirements are
//! planned against FIFO batch availability first, and only a fully
//! satisfiable plan is applied. Batch remainders, consumption audit rows,
//! chemical stock caches and the product's stock and weighted-average cost
//! all move in one transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::allocation::{plan_allocation, AllocationError, BatchAllocation, BatchAvailability};
use shared::costing::roll_average_cost;
use shared::models::{scale_requirement, status_for_remainder, ProductionOrderStatus};

/// Production order service
#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
}

/// Production order record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductionOrderRecord {
    pub id: Uuid,
    pub reference: String,
    pub formula_id: Uuid,
    pub product_id: Uuid,
    pub quantity_planned: i32,
    pub quantity_produced: i32,
    pub status: String,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Consumption audit record with chemical and lot context
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConsumptionRecord {
    pub id: Uuid,
    pub production_order_id: Uuid,
    pub batch_id: Uuid,
    pub chemical_id: Uuid,
    pub lot_code: String,
    pub quantity_used: Decimal,
    pub cost_per_unit: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a production order
#[derive(Debug, Deserialize)]
pub struct CreateProductionOrderInput {
    pub formula_id: Uuid,
    /// Explicit product override; defaults to the formula's linked product
    pub product_id: Option<Uuid>,
    pub quantity_planned: i32,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
}

/// One ingredient's planned consumption inside a run
struct IngredientPlan {
    chemical_id: Uuid,
    chemical_name: String,
    required: Decimal,
    plan: Vec<BatchAllocation>,
}

#[derive(Debug, FromRow)]
struct IngredientRow {
    chemical_id: Uuid,
    chemical_name: String,
    quantity_required: Decimal,
}

const ORDER_COLUMNS: &str = "id, reference, formula_id, product_id, quantity_planned, \
     quantity_produced, status, notes, notes_th, created_at, completed_at, updated_at";

impl ProductionService {
    /// Create a new ProductionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a production order in planned state
    pub async fn create_order(
        &self,
        input: CreateProductionOrderInput,
    ) -> AppResult<ProductionOrderRecord> {
        if input.quantity_planned <= 0 {
            return Err(AppError::Validation {
                field: "quantity_planned".to_string(),
                message: "Planned quantity must be positive".to_string(),
                message_th: "จำนวนที่วางแผนผลิตต้องเป็นค่าบวก".to_string(),
            });
        }

        let formula = sqlx::query_as::<_, (Option<Uuid>,)>(
            "SELECT product_id FROM formulas WHERE id = $1",
        )
        .bind(input.formula_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Formula".to_string()))?;

        let product_id = input.product_id.or(formula.0).ok_or_else(|| {
            AppError::InvalidFormula(
                "Formula has no linked product and none was given".to_string(),
            )
        })?;

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;
        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let reference = format!(
            "MO-{}",
            &Uuid::new_v4().simple().to_string()[..8].to_uppercase()
        );

        let order = sqlx::query_as::<_, ProductionOrderRecord>(&format!(
            r#"
            INSERT INTO production_orders (reference, formula_id, product_id, quantity_planned, notes, notes_th)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(&reference)
        .bind(input.formula_id)
        .bind(product_id)
        .bind(input.quantity_planned)
        .bind(&input.notes)
        .bind(&input.notes_th)
        .fetch_one(&self.db)
        .await?;

        Ok(order)
    }

    /// Get a production order by ID
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<ProductionOrderRecord> {
        let order = sqlx::query_as::<_, ProductionOrderRecord>(&format!(
            "SELECT {} FROM production_orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production order".to_string()))?;

        Ok(order)
    }

    /// List production orders, newest first
    pub async fn get_orders(&self) -> AppResult<Vec<ProductionOrderRecord>> {
        let orders = sqlx::query_as::<_, ProductionOrderRecord>(&format!(
            "SELECT {} FROM production_orders ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }

    /// Get the consumption audit trail of a production order
    pub async fn get_consumptions(&self, order_id: Uuid) -> AppResult<Vec<ConsumptionRecord>> {
        let order_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM production_orders WHERE id = $1)",
        )
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;
        if !order_exists {
            return Err(AppError::NotFound("Production order".to_string()));
        }

        let consumptions = sqlx::query_as::<_, ConsumptionRecord>(
            r#"
            SELECT pc.id, pc.production_order_id, pc.batch_id, pc.chemical_id,
                   b.lot_code, pc.quantity_used, pc.cost_per_unit, pc.created_at
            FROM production_consumptions pc
            JOIN chemical_batches b ON b.id = pc.batch_id
            WHERE pc.production_order_id = $1
            ORDER BY pc.created_at, pc.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(consumptions)
    }

    /// Cancel a planned production order (no inventory effect)
    pub async fn cancel_order(&self, order_id: Uuid) -> AppResult<ProductionOrderRecord> {
        let mut tx = self.db.begin().await?;

        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM production_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Production order".to_string()))?;

        if status != ProductionOrderStatus::Planned.as_str() {
            return Err(AppError::InvalidStateTransition(format!(
                "Only planned production orders can be cancelled, current status: {}",
                status
            )));
        }

        sqlx::query("UPDATE production_orders SET status = $1 WHERE id = $2")
            .bind(ProductionOrderStatus::Cancelled.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_order(order_id).await
    }

    /// Complete a planned production order
    ///
    /// Consumes ingredient batches oldest-first, writes the consumption
    /// audit trail, rolls the consumed cost into the product's
    /// weighted-average cost and raises its stock, then marks the order
    /// completed. Any failure rolls the whole run back.
    pub async fn complete_order(&self, order_id: Uuid) -> AppResult<ProductionOrderRecord> {
        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, ProductionOrderRecord>(&format!(
            "SELECT {} FROM production_orders WHERE id = $1 FOR UPDATE",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Production order".to_string()))?;

        if order.status != ProductionOrderStatus::Planned.as_str() {
            return Err(AppError::InvalidStateTransition(format!(
                "Only planned production orders can be completed, current status: {}",
                order.status
            )));
        }

        let ingredients = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT fi.chemical_id, c.name AS chemical_name, fi.quantity_required
            FROM formula_ingredients fi
            JOIN chemicals c ON c.id = fi.chemical_id
            WHERE fi.formula_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(order.formula_id)
        .fetch_all(&mut *tx)
        .await?;

        if ingredients.is_empty() {
            return Err(AppError::InvalidFormula(
                "Formula has no ingredients".to_string(),
            ));
        }

        let product = sqlx::query_as::<_, (i32, Decimal)>(
            "SELECT stock, price_buy FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(order.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        let (product_stock, product_avg_cost) = product;

        // Phase 1: plan every ingredient before touching any row, so a
        // shortfall on the last ingredient never leaves the first ones
        // half-consumed
        let mut plans = Vec::with_capacity(ingredients.len());
        for ingredient in &ingredients {
            let required =
                scale_requirement(ingredient.quantity_required, order.quantity_planned);
            let batches = Self::lock_allocatable_batches(&mut tx, ingredient.chemical_id).await?;

            let plan = plan_allocation(&batches, required).map_err(|e| match e {
                AllocationError::InsufficientStock {
                    required,
                    available,
                } => AppError::InsufficientStock(format!(
                    "{}: required {}, available {}",
                    ingredient.chemical_name, required, available
                )),
                AllocationError::NonPositiveRequirement(q) => AppError::IntegrityViolation(
                    format!("{}: non-positive requirement {}", ingredient.chemical_name, q),
                ),
            })?;

            plans.push(IngredientPlan {
                chemical_id: ingredient.chemical_id,
                chemical_name: ingredient.chemical_name.clone(),
                required,
                plan,
            });
        }

        // Phase 2: apply the plans and accumulate the run's batch cost
        let mut total_batch_cost = Decimal::ZERO;
        for ingredient in &plans {
            for slice in &ingredient.plan {
                let new_remaining = sqlx::query_scalar::<_, Decimal>(
                    r#"
                    UPDATE chemical_batches
                    SET quantity_remaining = quantity_remaining - $1
                    WHERE id = $2
                    RETURNING quantity_remaining
                    "#,
                )
                .bind(slice.quantity_taken)
                .bind(slice.batch_id)
                .fetch_one(&mut *tx)
                .await?;

                if new_remaining < Decimal::ZERO {
                    return Err(AppError::IntegrityViolation(format!(
                        "Batch {} remainder would go negative",
                        slice.batch_id
                    )));
                }

                sqlx::query("UPDATE chemical_batches SET status = $1 WHERE id = $2")
                    .bind(status_for_remainder(new_remaining).as_str())
                    .bind(slice.batch_id)
                    .execute(&mut *tx)
                    .await?;

                sqlx::query(
                    r#"
                    INSERT INTO production_consumptions
                        (production_order_id, batch_id, chemical_id, quantity_used, cost_per_unit)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(order_id)
                .bind(slice.batch_id)
                .bind(ingredient.chemical_id)
                .bind(slice.quantity_taken)
                .bind(slice.cost_per_unit)
                .execute(&mut *tx)
                .await?;

                total_batch_cost += slice.quantity_taken * slice.cost_per_unit;
            }

            sqlx::query(
                "UPDATE chemicals SET current_stock = current_stock - $1 WHERE id = $2",
            )
            .bind(ingredient.required)
            .bind(ingredient.chemical_id)
            .execute(&mut *tx)
            .await?;

            tracing::debug!(
                "Consumed {} of {} across {} batches",
                ingredient.required,
                ingredient.chemical_name,
                ingredient.plan.len()
            );
        }

        // Roll the run's cost into the product's weighted-average cost
        let produced = Decimal::from(order.quantity_planned);
        let new_avg_cost = roll_average_cost(
            Decimal::from(product_stock),
            product_avg_cost,
            produced,
            total_batch_cost,
        );

        sqlx::query("UPDATE products SET stock = stock + $1, price_buy = $2 WHERE id = $3")
            .bind(order.quantity_planned)
            .bind(new_avg_cost)
            .bind(order.product_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE production_orders
            SET status = $1, quantity_produced = $2, completed_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(ProductionOrderStatus::Completed.as_str())
        .bind(order.quantity_planned)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Production order {} completed: {} units at batch cost {}",
            order_id,
            order.quantity_planned,
            total_batch_cost
        );

        self.get_order(order_id).await
    }

    /// Lock and fetch a chemical's allocatable batches in FIFO order
    ///
    /// Row locks serialize concurrent runs over the same chemical; runs over
    /// disjoint chemicals proceed in parallel.
    async fn lock_allocatable_batches(
        tx: &mut Transaction<'_, Postgres>,
        chemical_id: Uuid,
    ) -> AppResult<Vec<BatchAvailability>> {
        let rows = sqlx::query_as::<_, (Uuid, Decimal, Decimal)>(
            r#"
            SELECT id, quantity_remaining, cost_per_unit
            FROM chemical_batches
            WHERE chemical_id = $1 AND status = 'active' AND quantity_remaining > 0
            ORDER BY received_date, id
            FOR UPDATE
            "#,
        )
        .bind(chemical_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(batch_id, quantity_remaining, cost_per_unit)| BatchAvailability {
                batch_id,
                quantity_remaining,
                cost_per_unit,
            })
            .collect())
    }
}
