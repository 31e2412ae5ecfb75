//! Purchase order models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A procurement intent against a supplier
///
/// Receiving a pending order is the only operation that creates batches.
/// Orders are received whole; there is no partial receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub reference: String,
    pub supplier_id: Uuid,
    pub status: PurchaseOrderStatus,
    /// Sum of line quantity x quoted cost
    pub total_cost: Decimal,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
    pub created_at: DateTime<Utc>,
    pub received_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// One ordered line of a purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub chemical_id: Uuid,
    pub quantity: Decimal,
    pub cost_per_unit: Decimal,
}

/// Purchase order lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Pending,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "pending",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PurchaseOrderStatus::Pending),
            "received" => Some(PurchaseOrderStatus::Received),
            "cancelled" => Some(PurchaseOrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Total cost of an order from its (quantity, cost_per_unit) lines
pub fn order_total(lines: &[(Decimal, Decimal)]) -> Decimal {
    lines.iter().map(|(quantity, cost)| quantity * cost).sum()
}
