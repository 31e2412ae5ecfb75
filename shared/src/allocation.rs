//! FIFO batch allocation planning
//!
//! The planner is pure: callers fetch the candidate batches for a chemical
//! in receipt order (oldest first, batch id as tie-break) and apply the
//! returned plan inside their own transaction. Validating every ingredient
//! before any write means a mid-run shortfall never leaves partial
//! consumption behind.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Snapshot of a batch available for allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAvailability {
    pub batch_id: Uuid,
    pub quantity_remaining: Decimal,
    pub cost_per_unit: Decimal,
}

/// One slice of an allocation plan: take this much from this batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAllocation {
    pub batch_id: Uuid,
    pub quantity_taken: Decimal,
    pub cost_per_unit: Decimal,
}

/// Allocation failures
#[derive(Debug, Error, PartialEq)]
pub enum AllocationError {
    #[error("required quantity must be positive, got {0}")]
    NonPositiveRequirement(Decimal),

    #[error("insufficient stock: required {required}, available {available}")]
    InsufficientStock {
        required: Decimal,
        available: Decimal,
    },
}

/// Plan a FIFO allocation of `required` across `batches`
///
/// `batches` must already be ordered oldest-received first; the walk takes
/// `min(remaining required, batch remainder)` from each batch until the
/// requirement is met. Total availability is checked up front so the error
/// is raised before any batch would be touched.
pub fn plan_allocation(
    batches: &[BatchAvailability],
    required: Decimal,
) -> Result<Vec<BatchAllocation>, AllocationError> {
    if required <= Decimal::ZERO {
        return Err(AllocationError::NonPositiveRequirement(required));
    }

    let available: Decimal = batches.iter().map(|b| b.quantity_remaining).sum();
    if available < required {
        return Err(AllocationError::InsufficientStock {
            required,
            available,
        });
    }

    let mut remaining = required;
    let mut plan = Vec::new();

    for batch in batches {
        if remaining <= Decimal::ZERO {
            break;
        }
        if batch.quantity_remaining <= Decimal::ZERO {
            continue;
        }

        let take = remaining.min(batch.quantity_remaining);
        plan.push(BatchAllocation {
            batch_id: batch.batch_id,
            quantity_taken: take,
            cost_per_unit: batch.cost_per_unit,
        });
        remaining -= take;
    }

    Ok(plan)
}

/// Cost contribution of a plan: sum of quantity taken x batch cost
pub fn allocation_cost(plan: &[BatchAllocation]) -> Decimal {
    plan.iter()
        .map(|a| a.quantity_taken * a.cost_per_unit)
        .sum()
}
