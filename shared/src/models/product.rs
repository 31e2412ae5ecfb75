//! Finished-good (product) models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finished good available for sale
///
/// `price_buy` is not a fixed purchase price: it is the running
/// weighted-average unit cost of the product, re-blended by every completed
/// production run and snapshotted into each sale line as COGS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    /// Integer units on hand
    pub stock: i32,
    pub price_sell: Decimal,
    /// Running weighted-average unit cost
    pub price_buy: Decimal,
    pub formula_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
