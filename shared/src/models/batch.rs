//! Traceable receipt-lot (batch) models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single traceable receipt of a raw material
///
/// `cost_per_unit` is fixed when the batch is received and never changes;
/// `quantity_remaining` only ever decreases and stays within
/// `0 ..= quantity_initial`. Batches are kept forever as traceability
/// records, even once fully depleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemicalBatch {
    pub id: Uuid,
    pub chemical_id: Uuid,
    pub supplier_id: Option<Uuid>,
    /// Internally generated lot code (e.g., "CMI-20250115-9f3a2c1b4d0e")
    pub lot_code: String,
    /// The supplier's own batch number, if provided on receipt
    pub supplier_batch_number: Option<String>,
    pub quantity_initial: Decimal,
    pub quantity_remaining: Decimal,
    pub cost_per_unit: Decimal,
    pub received_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle status of a batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Active,
    Depleted,
    Expired,
    Quarantine,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Active => "active",
            BatchStatus::Depleted => "depleted",
            BatchStatus::Expired => "expired",
            BatchStatus::Quarantine => "quarantine",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(BatchStatus::Active),
            "depleted" => Some(BatchStatus::Depleted),
            "expired" => Some(BatchStatus::Expired),
            "quarantine" => Some(BatchStatus::Quarantine),
            _ => None,
        }
    }

    /// Only active batches participate in FIFO allocation
    pub fn is_allocatable(&self) -> bool {
        matches!(self, BatchStatus::Active)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status a batch must carry for a given remainder: depleted iff zero
pub fn status_for_remainder(quantity_remaining: Decimal) -> BatchStatus {
    if quantity_remaining.is_zero() {
        BatchStatus::Depleted
    } else {
        BatchStatus::Active
    }
}
