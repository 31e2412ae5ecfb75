//! Batch allocation tests
//!
//! Tests for FIFO lot consumption including:
//! - Allocation order matches receipt order
//! - Conservation of consumed quantity
//! - Insufficient stock is raised before anything would be touched

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::allocation::{allocation_cost, plan_allocation, AllocationError, BatchAvailability};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn batch(id: u128, remaining: &str, cost: &str) -> BatchAvailability {
    BatchAvailability {
        batch_id: Uuid::from_u128(id),
        quantity_remaining: dec(remaining),
        cost_per_unit: dec(cost),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// The reference scenario: B1 (day 1, 5 @ 10) and B2 (day 2, 10 @ 12),
    /// production needs 8 units
    #[test]
    fn test_two_batch_scenario() {
        let batches = vec![batch(1, "5", "10"), batch(2, "10", "12")];

        let plan = plan_allocation(&batches, dec("8")).unwrap();

        // 5 from B1 (cost 50) + 3 from B2 (cost 36)
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].batch_id, Uuid::from_u128(1));
        assert_eq!(plan[0].quantity_taken, dec("5"));
        assert_eq!(plan[1].batch_id, Uuid::from_u128(2));
        assert_eq!(plan[1].quantity_taken, dec("3"));
        assert_eq!(allocation_cost(&plan), dec("86"));
    }

    /// Applying the scenario plan leaves B1 depleted and B2 at 7
    #[test]
    fn test_two_batch_scenario_remainders() {
        let mut batches = vec![batch(1, "5", "10"), batch(2, "10", "12")];

        let plan = plan_allocation(&batches, dec("8")).unwrap();
        for slice in &plan {
            let source = batches
                .iter_mut()
                .find(|b| b.batch_id == slice.batch_id)
                .unwrap();
            source.quantity_remaining -= slice.quantity_taken;
        }

        assert_eq!(batches[0].quantity_remaining, Decimal::ZERO);
        assert_eq!(batches[1].quantity_remaining, dec("7"));
    }

    /// A requirement met by the first batch never reaches the second
    #[test]
    fn test_oldest_batch_first() {
        let batches = vec![batch(1, "10", "10"), batch(2, "10", "5")];

        let plan = plan_allocation(&batches, dec("10")).unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].batch_id, Uuid::from_u128(1));
        // The cheaper, newer batch is not preferred: FIFO, not lowest-cost
        assert_eq!(allocation_cost(&plan), dec("100"));
    }

    /// Shortfall fails with the exact totals, before any mutation
    #[test]
    fn test_insufficient_stock_details() {
        let batches = vec![batch(1, "2.5", "10"), batch(2, "1.5", "12")];

        let err = plan_allocation(&batches, dec("5")).unwrap_err();

        assert_eq!(
            err,
            AllocationError::InsufficientStock {
                required: dec("5"),
                available: dec("4"),
            }
        );
    }

    /// Fractional quantities allocate exactly
    #[test]
    fn test_fractional_quantities() {
        let batches = vec![batch(1, "0.75", "8"), batch(2, "2.5", "9")];

        let plan = plan_allocation(&batches, dec("1.25")).unwrap();

        assert_eq!(plan[0].quantity_taken, dec("0.75"));
        assert_eq!(plan[1].quantity_taken, dec("0.50"));
        // 0.75 x 8 + 0.5 x 9
        assert_eq!(allocation_cost(&plan), dec("10.50"));
    }

    /// An exactly-sufficient pool is allowed
    #[test]
    fn test_exact_availability() {
        let batches = vec![batch(1, "3", "10"), batch(2, "5", "12")];

        let plan = plan_allocation(&batches, dec("8")).unwrap();

        let taken: Decimal = plan.iter().map(|a| a.quantity_taken).sum();
        assert_eq!(taken, dec("8"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating batch remainders
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=50_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for generating unit costs
    fn cost_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=500_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn batches_strategy() -> impl Strategy<Value = Vec<BatchAvailability>> {
        prop::collection::vec((quantity_strategy(), cost_strategy()), 1..12).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (remaining, cost))| BatchAvailability {
                    batch_id: Uuid::from_u128(i as u128 + 1),
                    quantity_remaining: remaining,
                    cost_per_unit: cost,
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Total remaining across all batches after applying a plan equals
        /// the total before minus exactly the required quantity
        #[test]
        fn prop_consumption_conserves_stock(
            batches in batches_strategy(),
            required in quantity_strategy()
        ) {
            let before: Decimal = batches.iter().map(|b| b.quantity_remaining).sum();

            if let Ok(plan) = plan_allocation(&batches, required) {
                let mut applied = batches.clone();
                for slice in &plan {
                    let source = applied
                        .iter_mut()
                        .find(|b| b.batch_id == slice.batch_id)
                        .unwrap();
                    source.quantity_remaining -= slice.quantity_taken;
                }

                let after: Decimal = applied.iter().map(|b| b.quantity_remaining).sum();
                prop_assert_eq!(after, before - required);

                // No remainder ever goes negative
                for b in &applied {
                    prop_assert!(b.quantity_remaining >= Decimal::ZERO);
                }
            }
        }

        /// A batch is only touched when every older batch is fully drained
        #[test]
        fn prop_strict_fifo(
            batches in batches_strategy(),
            required in quantity_strategy()
        ) {
            if let Ok(plan) = plan_allocation(&batches, required) {
                let mut applied = batches.clone();
                for slice in &plan {
                    let source = applied
                        .iter_mut()
                        .find(|b| b.batch_id == slice.batch_id)
                        .unwrap();
                    source.quantity_remaining -= slice.quantity_taken;
                }

                // Find the newest batch that was consumed from; every older
                // batch must be at zero afterwards
                let last_used = plan.last().map(|s| s.batch_id);
                if let Some(last_used) = last_used {
                    let last_pos = applied
                        .iter()
                        .position(|b| b.batch_id == last_used)
                        .unwrap();
                    for b in applied.iter().take(last_pos) {
                        prop_assert_eq!(b.quantity_remaining, Decimal::ZERO);
                    }
                }
            }
        }

        /// Plan cost is bounded by required x min/max unit cost
        #[test]
        fn prop_cost_bounded_by_unit_costs(
            batches in batches_strategy(),
            required in quantity_strategy()
        ) {
            if let Ok(plan) = plan_allocation(&batches, required) {
                let cost = allocation_cost(&plan);
                let min_cost = plan.iter().map(|s| s.cost_per_unit).min().unwrap();
                let max_cost = plan.iter().map(|s| s.cost_per_unit).max().unwrap();

                prop_assert!(cost >= required * min_cost);
                prop_assert!(cost <= required * max_cost);
            }
        }
    }
}
