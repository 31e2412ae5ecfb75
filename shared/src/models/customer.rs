//! Customer models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A retail customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub credit_limit: Decimal,
    pub loyalty_points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Loyalty points earned by a sale: one point per whole 100 of the total
pub fn loyalty_points_for_total(total: Decimal) -> i64 {
    if total <= Decimal::ZERO {
        return 0;
    }
    (total / Decimal::from(100))
        .floor()
        .try_into()
        .unwrap_or(0)
}
