//! Sales transaction models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completed retail sale
///
/// Transactions are immutable once written; corrections are modeled as a
/// compensating reversal transaction, never as an in-place edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub invoice_ref: String,
    pub customer_id: Option<Uuid>,
    /// The transaction this one reverses, for compensating entries
    pub reversal_of: Option<Uuid>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub net_profit: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub voided_at: Option<DateTime<Utc>>,
}

/// One sold line of a transaction
///
/// `cost_unit` is the product's weighted-average cost frozen at sale time;
/// later production runs never rewrite it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLine {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Sale price snapshot
    pub price_unit: Decimal,
    /// COGS snapshot
    pub cost_unit: Decimal,
    pub line_total: Decimal,
}

/// One tender entry of a (possibly split) payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPayment {
    pub id: Uuid,
    pub transaction_id: Uuid,
    /// Order of the tender entries as given at the till
    pub position: i32,
    pub method: PaymentMethod,
    pub amount: Decimal,
}

/// Transaction lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Voided,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Voided => "voided",
            TransactionStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(TransactionStatus::Completed),
            "voided" => Some(TransactionStatus::Voided),
            "refunded" => Some(TransactionStatus::Refunded),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supported tender methods
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Credit => "credit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "transfer" => Some(PaymentMethod::Transfer),
            "credit" => Some(PaymentMethod::Credit),
            _ => None,
        }
    }
}

/// Grand total of a sale from its pre-discount subtotal
pub fn sale_total(subtotal: Decimal, discount: Decimal, tax: Decimal) -> Decimal {
    subtotal - discount + tax
}

/// Net profit of a sale
///
/// Collected tax is pass-through and never counted as profit.
pub fn net_profit(subtotal: Decimal, discount: Decimal, total_cogs: Decimal) -> Decimal {
    subtotal - discount - total_cogs
}
