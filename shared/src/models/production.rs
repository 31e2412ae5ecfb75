//! Production order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A manufacturing run of a formula into its linked product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub id: Uuid,
    pub reference: String,
    pub formula_id: Uuid,
    pub product_id: Uuid,
    /// Yield units requested; ingredient needs scale linearly with this
    pub quantity_planned: i32,
    pub quantity_produced: i32,
    pub status: ProductionOrderStatus,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Production order lifecycle; completed and cancelled are terminal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductionOrderStatus {
    Planned,
    Completed,
    Cancelled,
}

impl ProductionOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionOrderStatus::Planned => "planned",
            ProductionOrderStatus::Completed => "completed",
            ProductionOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(ProductionOrderStatus::Planned),
            "completed" => Some(ProductionOrderStatus::Completed),
            "cancelled" => Some(ProductionOrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductionOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable audit record of one batch consumed by one production order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionConsumption {
    pub id: Uuid,
    pub production_order_id: Uuid,
    pub batch_id: Uuid,
    pub chemical_id: Uuid,
    pub quantity_used: Decimal,
    /// Batch cost at the time of use
    pub cost_per_unit: Decimal,
    pub created_at: DateTime<Utc>,
}
