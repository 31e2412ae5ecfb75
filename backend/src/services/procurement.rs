//! Procurement service for the purchase-order lifecycle
//!
//! Receiving a pending order is the only operation that creates chemical
//! batches. The whole line set is received at once: batch rows, lot codes
//! and the chemical stock caches move in one transaction or not at all.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::codes::CodeGenerator;
use shared::models::{order_total, PurchaseOrderStatus};
use shared::validation::{validate_non_negative_amount, validate_positive_quantity};

/// Purchase order service
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: PgPool,
    lot_codes: Arc<dyn CodeGenerator>,
}

/// Purchase order header record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseOrderRecord {
    pub id: Uuid,
    pub reference: String,
    pub supplier_id: Uuid,
    pub status: String,
    pub total_cost: Decimal,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
    pub created_at: DateTime<Utc>,
    pub received_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Purchase order line record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseOrderLineRecord {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub chemical_id: Uuid,
    pub quantity: Decimal,
    pub cost_per_unit: Decimal,
}

/// Purchase order with its lines
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderWithLines {
    #[serde(flatten)]
    pub order: PurchaseOrderRecord,
    pub lines: Vec<PurchaseOrderLineRecord>,
}

/// Input line for creating a purchase order
#[derive(Debug, Deserialize)]
pub struct CreateOrderLineInput {
    pub chemical_id: Uuid,
    pub quantity: Decimal,
    pub cost_per_unit: Decimal,
}

/// Input for creating a purchase order
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseOrderInput {
    pub supplier_id: Uuid,
    pub expected_date: Option<NaiveDate>,
    pub lines: Vec<CreateOrderLineInput>,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
}

/// Per-line receipt details
#[derive(Debug, Deserialize)]
pub struct ReceiveLineInput {
    pub line_id: Uuid,
    pub supplier_batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

/// Input for receiving a purchase order
#[derive(Debug, Deserialize)]
pub struct ReceivePurchaseOrderInput {
    /// One entry per order line; the order is received whole
    pub lines: Vec<ReceiveLineInput>,
    /// Defaults to today
    pub received_date: Option<NaiveDate>,
}

const ORDER_COLUMNS: &str = "id, reference, supplier_id, status, total_cost, expected_date, \
     notes, notes_th, created_at, received_at, updated_at";

const LINE_COLUMNS: &str = "id, purchase_order_id, chemical_id, quantity, cost_per_unit";

impl PurchaseOrderService {
    /// Create a new PurchaseOrderService instance
    pub fn new(db: PgPool, lot_codes: Arc<dyn CodeGenerator>) -> Self {
        Self { db, lot_codes }
    }

    /// Create a purchase order in pending state
    pub async fn create_order(
        &self,
        input: CreatePurchaseOrderInput,
    ) -> AppResult<PurchaseOrderWithLines> {
        if input.lines.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "A purchase order needs at least one line".to_string(),
                message_th: "ใบสั่งซื้อต้องมีรายการอย่างน้อยหนึ่งรายการ".to_string(),
            });
        }

        for line in &input.lines {
            if validate_positive_quantity(line.quantity).is_err() {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Line quantity must be positive".to_string(),
                    message_th: "ปริมาณในรายการต้องเป็นค่าบวก".to_string(),
                });
            }
            if validate_non_negative_amount(line.cost_per_unit).is_err() {
                return Err(AppError::Validation {
                    field: "cost_per_unit".to_string(),
                    message: "Line cost cannot be negative".to_string(),
                    message_th: "ต้นทุนในรายการต้องไม่ติดลบ".to_string(),
                });
            }
        }

        // Validate supplier and chemicals before writing anything
        let supplier_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(input.supplier_id)
                .fetch_one(&self.db)
                .await?;
        if !supplier_exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        for line in &input.lines {
            let chemical_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM chemicals WHERE id = $1)",
            )
            .bind(line.chemical_id)
            .fetch_one(&self.db)
            .await?;
            if !chemical_exists {
                return Err(AppError::NotFound(format!(
                    "Chemical {}",
                    line.chemical_id
                )));
            }
        }

        let total: Decimal = order_total(
            &input
                .lines
                .iter()
                .map(|l| (l.quantity, l.cost_per_unit))
                .collect::<Vec<_>>(),
        );
        let reference = format!(
            "PO-{}",
            &Uuid::new_v4().simple().to_string()[..8].to_uppercase()
        );

        let mut tx = self.db.begin().await?;

        let order_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO purchase_orders (reference, supplier_id, total_cost, expected_date, notes, notes_th)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&reference)
        .bind(input.supplier_id)
        .bind(total)
        .bind(input.expected_date)
        .bind(&input.notes)
        .bind(&input.notes_th)
        .fetch_one(&mut *tx)
        .await?;

        for line in &input.lines {
            sqlx::query(
                r#"
                INSERT INTO purchase_order_lines (purchase_order_id, chemical_id, quantity, cost_per_unit)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order_id)
            .bind(line.chemical_id)
            .bind(line.quantity)
            .bind(line.cost_per_unit)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_order(order_id).await
    }

    /// Get a purchase order with its lines
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<PurchaseOrderWithLines> {
        let order = sqlx::query_as::<_, PurchaseOrderRecord>(&format!(
            "SELECT {} FROM purchase_orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let lines = sqlx::query_as::<_, PurchaseOrderLineRecord>(&format!(
            "SELECT {} FROM purchase_order_lines WHERE purchase_order_id = $1 ORDER BY id",
            LINE_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseOrderWithLines { order, lines })
    }

    /// List purchase orders, newest first
    pub async fn get_orders(&self) -> AppResult<Vec<PurchaseOrderRecord>> {
        let orders = sqlx::query_as::<_, PurchaseOrderRecord>(&format!(
            "SELECT {} FROM purchase_orders ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }

    /// Cancel a pending purchase order (no inventory effect)
    pub async fn cancel_order(&self, order_id: Uuid) -> AppResult<PurchaseOrderWithLines> {
        let mut tx = self.db.begin().await?;

        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM purchase_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        if status != PurchaseOrderStatus::Pending.as_str() {
            return Err(AppError::InvalidStateTransition(format!(
                "Only pending purchase orders can be cancelled, current status: {}",
                status
            )));
        }

        sqlx::query("UPDATE purchase_orders SET status = $1 WHERE id = $2")
            .bind(PurchaseOrderStatus::Cancelled.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_order(order_id).await
    }

    /// Receive a pending purchase order, creating one traceable batch per
    /// line and bumping each chemical's cached stock, all or nothing
    pub async fn receive_order(
        &self,
        order_id: Uuid,
        input: ReceivePurchaseOrderInput,
    ) -> AppResult<PurchaseOrderWithLines> {
        let received_date = input
            .received_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM purchase_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        if status != PurchaseOrderStatus::Pending.as_str() {
            return Err(AppError::InvalidStateTransition(format!(
                "Only pending purchase orders can be received, current status: {}",
                status
            )));
        }

        let lines = sqlx::query_as::<_, PurchaseOrderLineRecord>(&format!(
            "SELECT {} FROM purchase_order_lines WHERE purchase_order_id = $1 ORDER BY id",
            LINE_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        // Full receive only: every order line must appear exactly once
        let mut receipt_by_line: HashMap<Uuid, &ReceiveLineInput> = HashMap::new();
        for entry in &input.lines {
            if receipt_by_line.insert(entry.line_id, entry).is_some() {
                return Err(AppError::Validation {
                    field: "lines".to_string(),
                    message: format!("Duplicate receipt entry for line {}", entry.line_id),
                    message_th: format!("มีข้อมูลรับสินค้าซ้ำสำหรับรายการ {}", entry.line_id),
                });
            }
        }
        if receipt_by_line.len() != lines.len()
            || !lines.iter().all(|l| receipt_by_line.contains_key(&l.id))
        {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "Receipt must cover every order line exactly once".to_string(),
                message_th: "การรับสินค้าต้องครอบคลุมทุกรายการของใบสั่งซื้อ".to_string(),
            });
        }

        let supplier_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT supplier_id FROM purchase_orders WHERE id = $1",
        )
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            let receipt = receipt_by_line[&line.id];
            let lot_code = self.lot_codes.next();

            sqlx::query(
                r#"
                INSERT INTO chemical_batches (
                    chemical_id, supplier_id, lot_code, supplier_batch_number,
                    quantity_initial, quantity_remaining, cost_per_unit,
                    received_date, expiry_date, status
                )
                VALUES ($1, $2, $3, $4, $5, $5, $6, $7, $8, 'active')
                "#,
            )
            .bind(line.chemical_id)
            .bind(supplier_id)
            .bind(&lot_code)
            .bind(&receipt.supplier_batch_number)
            .bind(line.quantity)
            .bind(line.cost_per_unit)
            .bind(received_date)
            .bind(receipt.expiry_date)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE chemicals SET current_stock = current_stock + $1 WHERE id = $2")
                .bind(line.quantity)
                .bind(line.chemical_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "UPDATE purchase_orders SET status = $1, received_at = NOW() WHERE id = $2",
        )
        .bind(PurchaseOrderStatus::Received.as_str())
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Purchase order {} received ({} batches)", order_id, lines.len());

        self.get_order(order_id).await
    }
}
