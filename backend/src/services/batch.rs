//! Batch (receipt lot) read accessors and status transitions
//!
//! Batches are created only by purchase-order receiving and consumed only by
//! production completion; this service never touches quantities or costs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{status_for_remainder, BatchStatus};

/// Batch service for traceability queries and quarantine handling
#[derive(Clone)]
pub struct BatchService {
    db: PgPool,
}

/// Batch record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BatchRecord {
    pub id: Uuid,
    pub chemical_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub lot_code: String,
    pub supplier_batch_number: Option<String>,
    pub quantity_initial: Decimal,
    pub quantity_remaining: Decimal,
    pub cost_per_unit: Decimal,
    pub received_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "id, chemical_id, supplier_id, lot_code, supplier_batch_number, \
     quantity_initial, quantity_remaining, cost_per_unit, received_date, expiry_date, \
     status, created_at, updated_at";

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List batches, optionally narrowed to one chemical, in receipt order
    pub async fn get_batches(&self, chemical_id: Option<Uuid>) -> AppResult<Vec<BatchRecord>> {
        let batches = match chemical_id {
            Some(chemical_id) => {
                sqlx::query_as::<_, BatchRecord>(&format!(
                    r#"
                    SELECT {}
                    FROM chemical_batches
                    WHERE chemical_id = $1
                    ORDER BY received_date, id
                    "#,
                    SELECT_COLUMNS
                ))
                .bind(chemical_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, BatchRecord>(&format!(
                    "SELECT {} FROM chemical_batches ORDER BY received_date, id",
                    SELECT_COLUMNS
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(batches)
    }

    /// Get a batch by ID
    pub async fn get_batch(&self, batch_id: Uuid) -> AppResult<BatchRecord> {
        let batch = sqlx::query_as::<_, BatchRecord>(&format!(
            "SELECT {} FROM chemical_batches WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(batch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        Ok(batch)
    }

    /// Get a batch by its lot code (for traceability lookups)
    pub async fn get_batch_by_lot_code(&self, lot_code: &str) -> AppResult<BatchRecord> {
        let batch = sqlx::query_as::<_, BatchRecord>(&format!(
            "SELECT {} FROM chemical_batches WHERE lot_code = $1",
            SELECT_COLUMNS
        ))
        .bind(lot_code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        Ok(batch)
    }

    /// Quarantine an active batch, excluding it from allocation
    ///
    /// Quarantined stock is still on the shelf, so the chemical's cached
    /// aggregate is reduced together with the status change.
    pub async fn quarantine_batch(&self, batch_id: Uuid) -> AppResult<BatchRecord> {
        self.transition(batch_id, BatchStatus::Quarantine, &[BatchStatus::Active])
            .await
    }

    /// Release a quarantined batch back into allocation
    pub async fn release_batch(&self, batch_id: Uuid) -> AppResult<BatchRecord> {
        self.transition(batch_id, BatchStatus::Active, &[BatchStatus::Quarantine])
            .await
    }

    /// Mark a batch as expired, excluding it from allocation
    pub async fn mark_expired(&self, batch_id: Uuid) -> AppResult<BatchRecord> {
        self.transition(
            batch_id,
            BatchStatus::Expired,
            &[BatchStatus::Active, BatchStatus::Quarantine],
        )
        .await
    }

    /// Apply a status transition, keeping the chemical's cached stock in
    /// step with which batches count as active
    async fn transition(
        &self,
        batch_id: Uuid,
        target: BatchStatus,
        allowed_from: &[BatchStatus],
    ) -> AppResult<BatchRecord> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, (Uuid, Decimal, String)>(
            "SELECT chemical_id, quantity_remaining, status FROM chemical_batches WHERE id = $1 FOR UPDATE",
        )
        .bind(batch_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        let (chemical_id, quantity_remaining, status) = row;
        let current = BatchStatus::from_str(&status).ok_or_else(|| {
            AppError::IntegrityViolation(format!("Batch {} has unknown status {}", batch_id, status))
        })?;

        if !allowed_from.contains(&current) {
            return Err(AppError::InvalidStateTransition(format!(
                "Batch cannot move from {} to {}",
                current, target
            )));
        }

        // A released batch with nothing left goes straight to depleted
        let target = if target == BatchStatus::Active {
            status_for_remainder(quantity_remaining)
        } else {
            target
        };

        sqlx::query("UPDATE chemical_batches SET status = $1 WHERE id = $2")
            .bind(target.as_str())
            .bind(batch_id)
            .execute(&mut *tx)
            .await?;

        // Cached stock counts active batches only
        let delta = match (current.is_allocatable(), target.is_allocatable()) {
            (true, false) => -quantity_remaining,
            (false, true) => quantity_remaining,
            _ => Decimal::ZERO,
        };
        if !delta.is_zero() {
            sqlx::query(
                "UPDATE chemicals SET current_stock = current_stock + $1 WHERE id = $2",
            )
            .bind(delta)
            .bind(chemical_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_batch(batch_id).await
    }
}
