//! Customer management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::{validate_email, validate_non_negative_amount, validate_thai_phone};

/// Customer service for retail customer records
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// Customer record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerRecord {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub credit_limit: Decimal,
    pub loyalty_points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a customer
#[derive(Debug, Deserialize)]
pub struct CreateCustomerInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub credit_limit: Option<Decimal>,
}

/// Input for updating a customer
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub credit_limit: Option<Decimal>,
}

const SELECT_COLUMNS: &str =
    "id, name, phone, email, credit_limit, loyalty_points, created_at, updated_at";

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a new customer
    pub async fn create_customer(&self, input: CreateCustomerInput) -> AppResult<CustomerRecord> {
        let credit_limit = input.credit_limit.unwrap_or(Decimal::ZERO);
        Self::validate(&input.name, &input.phone, &input.email, credit_limit)?;

        let customer = sqlx::query_as::<_, CustomerRecord>(&format!(
            r#"
            INSERT INTO customers (name, phone, email, credit_limit)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(credit_limit)
        .fetch_one(&self.db)
        .await?;

        Ok(customer)
    }

    /// Get a customer by ID
    pub async fn get_customer(&self, customer_id: Uuid) -> AppResult<CustomerRecord> {
        let customer = sqlx::query_as::<_, CustomerRecord>(&format!(
            "SELECT {} FROM customers WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        Ok(customer)
    }

    /// List all customers
    pub async fn get_customers(&self) -> AppResult<Vec<CustomerRecord>> {
        let customers = sqlx::query_as::<_, CustomerRecord>(&format!(
            "SELECT {} FROM customers ORDER BY name",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(customers)
    }

    /// Update a customer (loyalty points are owned by the sales workflow)
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        input: UpdateCustomerInput,
    ) -> AppResult<CustomerRecord> {
        let existing = self.get_customer(customer_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let phone = input.phone.or(existing.phone);
        let email = input.email.or(existing.email);
        let credit_limit = input.credit_limit.unwrap_or(existing.credit_limit);

        Self::validate(&name, &phone, &email, credit_limit)?;

        let customer = sqlx::query_as::<_, CustomerRecord>(&format!(
            r#"
            UPDATE customers
            SET name = $1, phone = $2, email = $3, credit_limit = $4
            WHERE id = $5
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(name.trim())
        .bind(&phone)
        .bind(&email)
        .bind(credit_limit)
        .bind(customer_id)
        .fetch_one(&self.db)
        .await?;

        Ok(customer)
    }

    fn validate(
        name: &str,
        phone: &Option<String>,
        email: &Option<String>,
        credit_limit: Decimal,
    ) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Customer name cannot be empty".to_string(),
                message_th: "ชื่อลูกค้าไม่สามารถว่างได้".to_string(),
            });
        }
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
        if validate_non_negative_amount(credit_limit).is_err() {
            return Err(AppError::Validation {
                field: "credit_limit".to_string(),
                message: "Credit limit cannot be negative".to_string(),
                message_th: "วงเงินเครดิตต้องไม่ติดลบ".to_string(),
            });
        }
        Ok(())
    }
}
