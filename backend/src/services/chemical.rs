//! Raw-material management service for chemical definitions and stock caches

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::UnitOfMeasure;
use shared::validation::validate_non_negative_amount;

/// Chemical service for managing raw-material definitions and the cached
/// stock aggregate
#[derive(Clone)]
pub struct ChemicalService {
    db: PgPool,
}

/// Chemical listing row with the derived average cost over remaining
/// active batches
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChemicalSummary {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub reorder_threshold: Decimal,
    pub current_stock: Decimal,
    /// Weighted-average cost of what is currently on the shelf
    pub avg_cost: Decimal,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a chemical
#[derive(Debug, Deserialize)]
pub struct CreateChemicalInput {
    pub name: String,
    pub unit: UnitOfMeasure,
    pub reorder_threshold: Option<Decimal>,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
}

/// Input for updating a chemical
#[derive(Debug, Deserialize)]
pub struct UpdateChemicalInput {
    pub name: Option<String>,
    pub reorder_threshold: Option<Decimal>,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
}

/// Result of reconciling the cached stock against the batch table
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileResult {
    pub chemical_id: Uuid,
    pub cached_stock: Decimal,
    pub computed_stock: Decimal,
    pub drift: Decimal,
    pub repaired: bool,
}

const SUMMARY_QUERY: &str = r#"
    SELECT c.id, c.name, c.unit, c.reorder_threshold, c.current_stock,
           COALESCE(SUM(b.quantity_remaining * b.cost_per_unit)
                    / NULLIF(SUM(b.quantity_remaining), 0), 0) AS avg_cost,
           c.notes, c.notes_th, c.created_at, c.updated_at
    FROM chemicals c
    LEFT JOIN chemical_batches b
           ON b.chemical_id = c.id
          AND b.status = 'active'
          AND b.quantity_remaining > 0
"#;

impl ChemicalService {
    /// Create a new ChemicalService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a new chemical
    pub async fn create_chemical(&self, input: CreateChemicalInput) -> AppResult<ChemicalSummary> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Chemical name cannot be empty".to_string(),
                message_th: "ชื่อสารเคมีไม่สามารถว่างได้".to_string(),
            });
        }

        let reorder_threshold = input.reorder_threshold.unwrap_or(Decimal::ZERO);
        if validate_non_negative_amount(reorder_threshold).is_err() {
            return Err(AppError::Validation {
                field: "reorder_threshold".to_string(),
                message: "Reorder threshold cannot be negative".to_string(),
                message_th: "จุดสั่งซื้อใหม่ต้องไม่ติดลบ".to_string(),
            });
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO chemicals (name, unit, reorder_threshold, notes, notes_th)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.unit.as_str())
        .bind(reorder_threshold)
        .bind(&input.notes)
        .bind(&input.notes_th)
        .fetch_one(&self.db)
        .await?;

        self.get_chemical(id).await
    }

    /// Get a chemical with its derived average cost
    pub async fn get_chemical(&self, chemical_id: Uuid) -> AppResult<ChemicalSummary> {
        let query = format!(
            "{} WHERE c.id = $1 GROUP BY c.id, c.name, c.unit, c.reorder_threshold, \
             c.current_stock, c.notes, c.notes_th, c.created_at, c.updated_at",
            SUMMARY_QUERY
        );

        let chemical = sqlx::query_as::<_, ChemicalSummary>(&query)
            .bind(chemical_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Chemical".to_string()))?;

        Ok(chemical)
    }

    /// List all chemicals with their derived average costs
    pub async fn get_chemicals(&self) -> AppResult<Vec<ChemicalSummary>> {
        let query = format!(
            "{} GROUP BY c.id, c.name, c.unit, c.reorder_threshold, c.current_stock, \
             c.notes, c.notes_th, c.created_at, c.updated_at ORDER BY c.name",
            SUMMARY_QUERY
        );

        let chemicals = sqlx::query_as::<_, ChemicalSummary>(&query)
            .fetch_all(&self.db)
            .await?;

        Ok(chemicals)
    }

    /// List chemicals at or below their reorder threshold
    pub async fn get_low_stock(&self) -> AppResult<Vec<ChemicalSummary>> {
        let query = format!(
            "{} WHERE c.reorder_threshold > 0 AND c.current_stock <= c.reorder_threshold \
             GROUP BY c.id, c.name, c.unit, c.reorder_threshold, c.current_stock, \
             c.notes, c.notes_th, c.created_at, c.updated_at ORDER BY c.name",
            SUMMARY_QUERY
        );

        let chemicals = sqlx::query_as::<_, ChemicalSummary>(&query)
            .fetch_all(&self.db)
            .await?;

        Ok(chemicals)
    }

    /// Update a chemical definition
    pub async fn update_chemical(
        &self,
        chemical_id: Uuid,
        input: UpdateChemicalInput,
    ) -> AppResult<ChemicalSummary> {
        let existing = sqlx::query_as::<_, (String, Decimal, Option<String>, Option<String>)>(
            "SELECT name, reorder_threshold, notes, notes_th FROM chemicals WHERE id = $1",
        )
        .bind(chemical_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Chemical".to_string()))?;

        let name = input.name.unwrap_or(existing.0);
        let reorder_threshold = input.reorder_threshold.unwrap_or(existing.1);
        let notes = input.notes.or(existing.2);
        let notes_th = input.notes_th.or(existing.3);

        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Chemical name cannot be empty".to_string(),
                message_th: "ชื่อสารเคมีไม่สามารถว่างได้".to_string(),
            });
        }
        if validate_non_negative_amount(reorder_threshold).is_err() {
            return Err(AppError::Validation {
                field: "reorder_threshold".to_string(),
                message: "Reorder threshold cannot be negative".to_string(),
                message_th: "จุดสั่งซื้อใหม่ต้องไม่ติดลบ".to_string(),
            });
        }

        sqlx::query(
            "UPDATE chemicals SET name = $1, reorder_threshold = $2, notes = $3, notes_th = $4 WHERE id = $5",
        )
        .bind(name.trim())
        .bind(reorder_threshold)
        .bind(&notes)
        .bind(&notes_th)
        .bind(chemical_id)
        .execute(&self.db)
        .await?;

        self.get_chemical(chemical_id).await
    }

    /// Recompute the cached stock aggregate from the batch table and repair
    /// any drift
    ///
    /// The cache is maintained transactionally alongside every batch
    /// mutation, so a non-zero drift indicates a bug or outside
    /// interference; this routine exists to detect and repair it.
    pub async fn reconcile_stock(&self, chemical_id: Uuid) -> AppResult<ReconcileResult> {
        let mut tx = self.db.begin().await?;

        let cached = sqlx::query_scalar::<_, Decimal>(
            "SELECT current_stock FROM chemicals WHERE id = $1 FOR UPDATE",
        )
        .bind(chemical_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Chemical".to_string()))?;

        let computed = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(quantity_remaining), 0)
            FROM chemical_batches
            WHERE chemical_id = $1 AND status = 'active'
            "#,
        )
        .bind(chemical_id)
        .fetch_one(&mut *tx)
        .await?;

        let drift = cached - computed;
        let repaired = !drift.is_zero();

        if repaired {
            tracing::warn!(
                "Stock cache drift for chemical {}: cached {}, computed {}",
                chemical_id,
                cached,
                computed
            );
            sqlx::query("UPDATE chemicals SET current_stock = $1 WHERE id = $2")
                .bind(computed)
                .bind(chemical_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(ReconcileResult {
            chemical_id,
            cached_stock: cached,
            computed_stock: computed,
            drift,
            repaired,
        })
    }
}
