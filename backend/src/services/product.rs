//! Finished-good (product) management service
//!
//! Stock and average cost are owned by the production and sales workflows;
//! this service only manages product definitions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::{validate_non_negative_amount, validate_sku};

/// Product service for finished-good definitions
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Product record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductRecord {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub stock: i32,
    pub price_sell: Decimal,
    /// Running weighted-average unit cost
    pub price_buy: Decimal,
    pub formula_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub sku: String,
    pub name: String,
    pub price_sell: Decimal,
    pub formula_id: Option<Uuid>,
}

/// Input for updating a product definition
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub price_sell: Option<Decimal>,
    pub formula_id: Option<Uuid>,
}

const SELECT_COLUMNS: &str =
    "id, sku, name, stock, price_sell, price_buy, formula_id, created_at, updated_at";

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product with zero stock and cost
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<ProductRecord> {
        if validate_sku(&input.sku).is_err() {
            return Err(AppError::Validation {
                field: "sku".to_string(),
                message: "SKU must be 3-32 uppercase alphanumeric characters".to_string(),
                message_th: "SKU ต้องเป็นตัวอักษรพิมพ์ใหญ่หรือตัวเลข 3-32 ตัว".to_string(),
            });
        }
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name cannot be empty".to_string(),
                message_th: "ชื่อสินค้าไม่สามารถว่างได้".to_string(),
            });
        }
        if validate_non_negative_amount(input.price_sell).is_err() {
            return Err(AppError::Validation {
                field: "price_sell".to_string(),
                message: "Selling price cannot be negative".to_string(),
                message_th: "ราคาขายต้องไม่ติดลบ".to_string(),
            });
        }

        if let Some(formula_id) = input.formula_id {
            let formula_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM formulas WHERE id = $1)",
            )
            .bind(formula_id)
            .fetch_one(&self.db)
            .await?;
            if !formula_exists {
                return Err(AppError::NotFound("Formula".to_string()));
            }
        }

        let product = sqlx::query_as::<_, ProductRecord>(&format!(
            r#"
            INSERT INTO products (sku, name, price_sell, formula_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(input.sku.trim())
        .bind(input.name.trim())
        .bind(input.price_sell)
        .bind(input.formula_id)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    /// Get a product by ID
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<ProductRecord> {
        let product = sqlx::query_as::<_, ProductRecord>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(product)
    }

    /// List all products
    pub async fn get_products(&self) -> AppResult<Vec<ProductRecord>> {
        let products = sqlx::query_as::<_, ProductRecord>(&format!(
            "SELECT {} FROM products ORDER BY name",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Update a product definition (never stock or average cost)
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<ProductRecord> {
        let existing = self.get_product(product_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let price_sell = input.price_sell.unwrap_or(existing.price_sell);
        let formula_id = input.formula_id.or(existing.formula_id);

        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name cannot be empty".to_string(),
                message_th: "ชื่อสินค้าไม่สามารถว่างได้".to_string(),
            });
        }
        if validate_non_negative_amount(price_sell).is_err() {
            return Err(AppError::Validation {
                field: "price_sell".to_string(),
                message: "Selling price cannot be negative".to_string(),
                message_th: "ราคาขายต้องไม่ติดลบ".to_string(),
            });
        }

        let product = sqlx::query_as::<_, ProductRecord>(&format!(
            r#"
            UPDATE products
            SET name = $1, price_sell = $2, formula_id = $3
            WHERE id = $4
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(name.trim())
        .bind(price_sell)
        .bind(formula_id)
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }
}
