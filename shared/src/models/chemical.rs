//! Raw-material (chemical) models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw material tracked in the inventory ledger
///
/// `current_stock` is a denormalized cache of the sum of active batch
/// remainders; it is maintained inside the same transaction as every batch
/// mutation and can be rebuilt from the batch table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chemical {
    pub id: Uuid,
    pub name: String,
    pub unit: UnitOfMeasure,
    pub reorder_threshold: Decimal,
    pub current_stock: Decimal,
    pub notes: Option<String>,
    pub notes_th: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Units of measure for raw materials
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    Kilogram,
    Gram,
    Liter,
    Milliliter,
    Piece,
}

impl UnitOfMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Kilogram => "kg",
            UnitOfMeasure::Gram => "g",
            UnitOfMeasure::Liter => "l",
            UnitOfMeasure::Milliliter => "ml",
            UnitOfMeasure::Piece => "piece",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "kg" => Some(UnitOfMeasure::Kilogram),
            "g" => Some(UnitOfMeasure::Gram),
            "l" => Some(UnitOfMeasure::Liter),
            "ml" => Some(UnitOfMeasure::Milliliter),
            "piece" => Some(UnitOfMeasure::Piece),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check whether a chemical has fallen to or below its reorder threshold
pub fn is_below_reorder_threshold(current_stock: Decimal, threshold: Decimal) -> bool {
    threshold > Decimal::ZERO && current_stock <= threshold
}
