//! Supplier management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::{validate_email, validate_supplier_rating, validate_thai_phone};

/// Supplier service for vendor records and quality ratings
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Supplier record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SupplierRecord {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub rating: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize)]
pub struct CreateSupplierInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub rating: Option<Decimal>,
}

/// Input for updating a supplier
#[derive(Debug, Deserialize)]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub rating: Option<Decimal>,
}

const SELECT_COLUMNS: &str =
    "id, name, contact_person, phone, email, rating, created_at, updated_at";

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a new supplier
    pub async fn create_supplier(&self, input: CreateSupplierInput) -> AppResult<SupplierRecord> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Supplier name cannot be empty".to_string(),
                message_th: "ชื่อผู้จำหน่ายไม่สามารถว่างได้".to_string(),
            });
        }

        let rating = input.rating.unwrap_or(Decimal::ZERO);
        Self::validate_contact(&input.phone, &input.email, rating)?;

        let supplier = sqlx::query_as::<_, SupplierRecord>(&format!(
            r#"
            INSERT INTO suppliers (name, contact_person, phone, email, rating)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(rating)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// Get a supplier by ID
    pub async fn get_supplier(&self, supplier_id: Uuid) -> AppResult<SupplierRecord> {
        let supplier = sqlx::query_as::<_, SupplierRecord>(&format!(
            "SELECT {} FROM suppliers WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        Ok(supplier)
    }

    /// List all suppliers
    pub async fn get_suppliers(&self) -> AppResult<Vec<SupplierRecord>> {
        let suppliers = sqlx::query_as::<_, SupplierRecord>(&format!(
            "SELECT {} FROM suppliers ORDER BY name",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    /// Update a supplier
    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        input: UpdateSupplierInput,
    ) -> AppResult<SupplierRecord> {
        let existing = self.get_supplier(supplier_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let contact_person = input.contact_person.or(existing.contact_person);
        let phone = input.phone.or(existing.phone);
        let email = input.email.or(existing.email);
        let rating = input.rating.unwrap_or(existing.rating);

        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Supplier name cannot be empty".to_string(),
                message_th: "ชื่อผู้จำหน่ายไม่สามารถว่างได้".to_string(),
            });
        }
        Self::validate_contact(&phone, &email, rating)?;

        let supplier = sqlx::query_as::<_, SupplierRecord>(&format!(
            r#"
            UPDATE suppliers
            SET name = $1, contact_person = $2, phone = $3, email = $4, rating = $5
            WHERE id = $6
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(name.trim())
        .bind(&contact_person)
        .bind(&phone)
        .bind(&email)
        .bind(rating)
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    fn validate_contact(
        phone: &Option<String>,
        email: &Option<String>,
        rating: Decimal,
    ) -> AppResult<()> {
        if let Some(phone) = phone {
            if validate_thai_phone(phone).is_err() {
                return Err(AppError::Validation {
                    field: "phone".to_string(),
                    message: "Invalid phone number".to_string(),
                    message_th: "หมายเลขโทรศัพท์ไม่ถูกต้อง".to_string(),
                });
            }
        }
        if let Some(email) = email {
            if validate_email(email).is_err() {
                return Err(AppError::Validation {
                    field: "email".to_string(),
                    message: "Invalid email format".to_string(),
                    message_th: "รูปแบบอีเมลไม่ถูกต้อง".to_string(),
                });
            }
        }
        if validate_supplier_rating(rating).is_err() {
            return Err(AppError::Validation {
                field: "rating".to_string(),
                message: "Rating must be between 0 and 5".to_string(),
                message_th: "คะแนนต้องอยู่ระหว่าง 0 ถึง 5".to_string(),
            });
        }
        Ok(())
    }
}
