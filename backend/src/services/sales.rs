//! Sales service for retail transactions
//!
//! Each sale atomically freezes the product's current weighted-average cost
//! into its lines as COGS, decrements finished-good stock, and records a
//! split-tender payment breakdown. Historical transactions are never edited;
//! corrections go through a compensating reversal.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::codes::CodeGenerator;
use shared::models::{
    loyalty_points_for_total, net_profit, sale_total, PaymentMethod, TransactionStatus,
};
use shared::validation::{validate_discount, validate_payment_breakdown};

/// Sales service
#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
    invoice_codes: Arc<dyn CodeGenerator>,
}

/// Transaction header record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub invoice_ref: String,
    pub customer_id: Option<Uuid>,
    pub reversal_of: Option<Uuid>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub net_profit: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub voided_at: Option<DateTime<Utc>>,
}

/// Transaction line record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransactionLineRecord {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_unit: Decimal,
    pub cost_unit: Decimal,
    pub line_total: Decimal,
}

/// Payment entry record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub position: i32,
    pub method: String,
    pub amount: Decimal,
}

/// Transaction with lines and payments
#[derive(Debug, Clone, Serialize)]
pub struct TransactionWithDetails {
    #[serde(flatten)]
    pub transaction: TransactionRecord,
    pub lines: Vec<TransactionLineRecord>,
    pub payments: Vec<PaymentRecord>,
}

/// Input line for a sale
#[derive(Debug, Deserialize)]
pub struct SaleLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Sale price per unit as charged at the till
    pub price_unit: Decimal,
}

/// One tender entry of the payment breakdown
#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub method: PaymentMethod,
    pub amount: Decimal,
}

/// Input for processing a sale
#[derive(Debug, Deserialize)]
pub struct ProcessSaleInput {
    pub customer_id: Option<Uuid>,
    pub lines: Vec<SaleLineInput>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
    /// Ordered tender entries; must sum to the transaction total
    pub payments: Vec<PaymentInput>,
}

const TRANSACTION_COLUMNS: &str = "id, invoice_ref, customer_id, reversal_of, subtotal, \
     discount, tax, total, net_profit, status, created_at, voided_at";

const LINE_COLUMNS: &str =
    "id, transaction_id, product_id, quantity, price_unit, cost_unit, line_total";

const PAYMENT_COLUMNS: &str = "id, transaction_id, position, method, amount";

impl SalesService {
    /// Create a new SalesService instance
    pub fn new(db: PgPool, invoice_codes: Arc<dyn CodeGenerator>) -> Self {
        Self { db, invoice_codes }
    }

    /// Process a sale atomically
    ///
    /// Oversell is rejected: a line asking for more than the product's stock
    /// fails the whole sale with insufficient stock and no writes.
    pub async fn process_sale(&self, input: ProcessSaleInput) -> AppResult<TransactionWithDetails> {
        if input.lines.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "A sale needs at least one line".to_string(),
                message_th: "การขายต้องมีรายการอย่างน้อยหนึ่งรายการ".to_string(),
            });
        }
        for line in &input.lines {
            if line.quantity <= 0 {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Line quantity must be positive".to_string(),
                    message_th: "จำนวนในรายการต้องเป็นค่าบวก".to_string(),
                });
            }
            if line.price_unit < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "price_unit".to_string(),
                    message: "Line price cannot be negative".to_string(),
                    message_th: "ราคาในรายการต้องไม่ติดลบ".to_string(),
                });
            }
        }

        // Totals are fully determined by the input, so the discount and the
        // payment breakdown can be validated before any row is touched
        let subtotal: Decimal = input
            .lines
            .iter()
            .map(|l| l.price_unit * Decimal::from(l.quantity))
            .sum();
        let discount = input.discount.unwrap_or(Decimal::ZERO);
        let tax = input.tax.unwrap_or(Decimal::ZERO);

        if let Err(message) = validate_discount(discount, subtotal) {
            return Err(AppError::Validation {
                field: "discount".to_string(),
                message: message.to_string(),
                message_th: "ส่วนลดไม่ถูกต้อง".to_string(),
            });
        }
        if tax < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "tax".to_string(),
                message: "Tax cannot be negative".to_string(),
                message_th: "ภาษีต้องไม่ติดลบ".to_string(),
            });
        }

        let total = sale_total(subtotal, discount, tax);
        let payment_amounts: Vec<Decimal> = input.payments.iter().map(|p| p.amount).collect();
        if let Err(message) = validate_payment_breakdown(&payment_amounts, total) {
            return Err(AppError::Validation {
                field: "payments".to_string(),
                message: message.to_string(),
                message_th: "ยอดชำระเงินต้องรวมเท่ากับยอดรวมของรายการขาย".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        if let Some(customer_id) = input.customer_id {
            let customer_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)",
            )
            .bind(customer_id)
            .fetch_one(&mut *tx)
            .await?;
            if !customer_exists {
                return Err(AppError::NotFound("Customer".to_string()));
            }
        }

        // Freeze each line's COGS from the product's current average cost
        // and take the stock, holding row locks for the whole sale
        let mut priced_lines = Vec::with_capacity(input.lines.len());
        let mut total_cogs = Decimal::ZERO;
        for line in &input.lines {
            let product = sqlx::query_as::<_, (String, i32, Decimal)>(
                "SELECT name, stock, price_buy FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", line.product_id)))?;
            let (name, stock, cost_unit) = product;

            if line.quantity > stock {
                return Err(AppError::InsufficientStock(format!(
                    "{}: requested {}, in stock {}",
                    name, line.quantity, stock
                )));
            }

            sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2")
                .bind(line.quantity)
                .bind(line.product_id)
                .execute(&mut *tx)
                .await?;

            let line_total = line.price_unit * Decimal::from(line.quantity);
            total_cogs += cost_unit * Decimal::from(line.quantity);
            priced_lines.push((line, cost_unit, line_total));
        }

        let profit = net_profit(subtotal, discount, total_cogs);
        let invoice_ref = self.invoice_codes.next();

        let transaction_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO transactions
                (invoice_ref, customer_id, subtotal, discount, tax, total, net_profit, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&invoice_ref)
        .bind(input.customer_id)
        .bind(subtotal)
        .bind(discount)
        .bind(tax)
        .bind(total)
        .bind(profit)
        .bind(TransactionStatus::Completed.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for (line, cost_unit, line_total) in &priced_lines {
            sqlx::query(
                r#"
                INSERT INTO transaction_lines
                    (transaction_id, product_id, quantity, price_unit, cost_unit, line_total)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(transaction_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price_unit)
            .bind(cost_unit)
            .bind(line_total)
            .execute(&mut *tx)
            .await?;
        }

        for (position, payment) in input.payments.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO transaction_payments (transaction_id, position, method, amount)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(transaction_id)
            .bind(position as i32)
            .bind(payment.method.as_str())
            .bind(payment.amount)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(customer_id) = input.customer_id {
            let points = loyalty_points_for_total(total);
            if points > 0 {
                sqlx::query(
                    "UPDATE customers SET loyalty_points = loyalty_points + $1 WHERE id = $2",
                )
                .bind(points)
                .bind(customer_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            "Sale {} completed: total {}, profit {}",
            invoice_ref,
            total,
            profit
        );

        self.get_sale(transaction_id).await
    }

    /// Get a transaction with its lines and payments
    pub async fn get_sale(&self, transaction_id: Uuid) -> AppResult<TransactionWithDetails> {
        let transaction = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {} FROM transactions WHERE id = $1",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

        let lines = sqlx::query_as::<_, TransactionLineRecord>(&format!(
            "SELECT {} FROM transaction_lines WHERE transaction_id = $1 ORDER BY id",
            LINE_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_all(&self.db)
        .await?;

        let payments = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {} FROM transaction_payments WHERE transaction_id = $1 ORDER BY position",
            PAYMENT_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_all(&self.db)
        .await?;

        Ok(TransactionWithDetails {
            transaction,
            lines,
            payments,
        })
    }

    /// List transactions, newest first
    pub async fn get_sales(&self) -> AppResult<Vec<TransactionRecord>> {
        let transactions = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {} FROM transactions ORDER BY created_at DESC",
            TRANSACTION_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(transactions)
    }

    /// Void a completed sale with a compensating reversal
    ///
    /// Restores each line's product stock and writes a reversal transaction
    /// carrying negated amounts with the original COGS snapshots copied
    /// over, then marks the original voided. The original rows are never
    /// edited in place.
    pub async fn void_sale(&self, transaction_id: Uuid) -> AppResult<TransactionWithDetails> {
        let mut tx = self.db.begin().await?;

        let original = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {} FROM transactions WHERE id = $1 FOR UPDATE",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

        if original.status != TransactionStatus::Completed.as_str() {
            return Err(AppError::InvalidStateTransition(format!(
                "Only completed transactions can be voided, current status: {}",
                original.status
            )));
        }
        if original.reversal_of.is_some() {
            return Err(AppError::InvalidStateTransition(
                "Compensating entries cannot be voided".to_string(),
            ));
        }

        let lines = sqlx::query_as::<_, TransactionLineRecord>(&format!(
            "SELECT {} FROM transaction_lines WHERE transaction_id = $1 ORDER BY id",
            LINE_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_all(&mut *tx)
        .await?;

        let payments = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {} FROM transaction_payments WHERE transaction_id = $1 ORDER BY position",
            PAYMENT_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_all(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query("UPDATE products SET stock = stock + $1 WHERE id = $2")
                .bind(line.quantity)
                .bind(line.product_id)
                .execute(&mut *tx)
                .await?;
        }

        let reversal_ref = self.invoice_codes.next();
        let reversal_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO transactions
                (invoice_ref, customer_id, reversal_of, subtotal, discount, tax, total, net_profit, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&reversal_ref)
        .bind(original.customer_id)
        .bind(original.id)
        .bind(-original.subtotal)
        .bind(-original.discount)
        .bind(-original.tax)
        .bind(-original.total)
        .bind(-original.net_profit)
        .bind(TransactionStatus::Refunded.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                r#"
                INSERT INTO transaction_lines
                    (transaction_id, product_id, quantity, price_unit, cost_unit, line_total)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(reversal_id)
            .bind(line.product_id)
            .bind(-line.quantity)
            .bind(line.price_unit)
            .bind(line.cost_unit)
            .bind(-line.line_total)
            .execute(&mut *tx)
            .await?;
        }

        for payment in &payments {
            sqlx::query(
                r#"
                INSERT INTO transaction_payments (transaction_id, position, method, amount)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(reversal_id)
            .bind(payment.position)
            .bind(&payment.method)
            .bind(-payment.amount)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(customer_id) = original.customer_id {
            let points = loyalty_points_for_total(original.total);
            if points > 0 {
                sqlx::query(
                    "UPDATE customers SET loyalty_points = GREATEST(loyalty_points - $1, 0) WHERE id = $2",
                )
                .bind(points)
                .bind(customer_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query("UPDATE transactions SET status = $1, voided_at = NOW() WHERE id = $2")
            .bind(TransactionStatus::Voided.as_str())
            .bind(transaction_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Sale {} voided by reversal {}", original.invoice_ref, reversal_ref);

        self.get_sale(reversal_id).await
    }
}
