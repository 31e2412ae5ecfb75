//! Weighted-average costing
//!
//! Perpetual weighted-average method: every receipt of finished stock blends
//! its cost into the product's running average instead of tracking output
//! lots separately. The raw-material side stays lot-specific (see
//! [`crate::allocation`]); only finished goods are averaged.

use rust_decimal::Decimal;

use crate::allocation::BatchAvailability;

/// Roll a new receipt into a running weighted-average unit cost
///
/// `new_avg = (current_stock x current_avg + incoming_total) /
/// (current_stock + incoming_qty)`. A zero incoming quantity leaves the
/// average unchanged rather than dividing by zero.
pub fn roll_average_cost(
    current_stock: Decimal,
    current_avg_cost: Decimal,
    incoming_qty: Decimal,
    incoming_total_cost: Decimal,
) -> Decimal {
    if incoming_qty <= Decimal::ZERO {
        return current_avg_cost;
    }

    let combined = current_stock + incoming_qty;
    if combined <= Decimal::ZERO {
        return current_avg_cost;
    }

    (current_stock * current_avg_cost + incoming_total_cost) / combined
}

/// Weighted-average cost over currently remaining batch quantities
///
/// Used for the procurement preview on chemical listings; zero remaining
/// stock values at zero.
pub fn weighted_average_cost(batches: &[BatchAvailability]) -> Decimal {
    let total_quantity: Decimal = batches.iter().map(|b| b.quantity_remaining).sum();
    if total_quantity <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let total_value: Decimal = batches
        .iter()
        .map(|b| b.quantity_remaining * b.cost_per_unit)
        .sum();
    total_value / total_quantity
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_roll_from_zero_stock() {
        // First run: 10 units costing 86 in total
        let avg = roll_average_cost(Decimal::ZERO, Decimal::ZERO, dec("10"), dec("86"));
        assert_eq!(avg, dec("8.6"));
    }

    #[test]
    fn test_roll_blends_with_existing() {
        // 10 on hand at 8.6, second run of 5 costing 50
        let avg = roll_average_cost(dec("10"), dec("8.6"), dec("5"), dec("50"));
        assert_eq!(avg.round_dp(6), dec("9.066667"));
    }

    #[test]
    fn test_zero_incoming_keeps_cost() {
        let avg = roll_average_cost(dec("10"), dec("8.6"), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(avg, dec("8.6"));
    }

    #[test]
    fn test_cheaper_incoming_lowers_average() {
        let avg = roll_average_cost(dec("10"), dec("20"), dec("10"), dec("100"));
        assert_eq!(avg, dec("15"));
    }

    #[test]
    fn test_weighted_average_over_batches() {
        let batches = vec![
            BatchAvailability {
                batch_id: Uuid::from_u128(1),
                quantity_remaining: dec("5"),
                cost_per_unit: dec("10"),
            },
            BatchAvailability {
                batch_id: Uuid::from_u128(2),
                quantity_remaining: dec("10"),
                cost_per_unit: dec("12"),
            },
        ];

        // (5x10 + 10x12) / 15
        assert_eq!(
            weighted_average_cost(&batches).round_dp(6),
            dec("11.333333")
        );
    }

    #[test]
    fn test_weighted_average_empty() {
        assert_eq!(weighted_average_cost(&[]), Decimal::ZERO);
    }

    fn stock_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn cost_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// With positive stock on both sides the new average is a convex
        /// combination of the old cost and the incoming unit cost
        #[test]
        fn prop_rolled_average_is_convex(
            current_stock in (1i64..=100_000i64).prop_map(|n| Decimal::new(n, 2)),
            current_avg in cost_strategy(),
            incoming_qty in (1i64..=100_000i64).prop_map(|n| Decimal::new(n, 2)),
            incoming_unit_cost in cost_strategy()
        ) {
            let incoming_total = incoming_qty * incoming_unit_cost;
            let new_avg = roll_average_cost(
                current_stock,
                current_avg,
                incoming_qty,
                incoming_total,
            );

            let lo = current_avg.min(incoming_unit_cost);
            let hi = current_avg.max(incoming_unit_cost);
            prop_assert!(new_avg >= lo);
            prop_assert!(new_avg <= hi);
        }

        /// Rolling in zero quantity never changes the average
        #[test]
        fn prop_zero_incoming_is_identity(
            current_stock in stock_strategy(),
            current_avg in cost_strategy(),
            incoming_total in cost_strategy()
        ) {
            let avg = roll_average_cost(
                current_stock,
                current_avg,
                Decimal::ZERO,
                incoming_total,
            );
            prop_assert_eq!(avg, current_avg);
        }

        /// From empty stock the rolled average is exactly the incoming
        /// unit cost
        #[test]
        fn prop_bootstrap_equals_incoming_unit_cost(
            incoming_qty in (1i64..=100_000i64).prop_map(|n| Decimal::new(n, 2)),
            incoming_unit_cost in cost_strategy()
        ) {
            let incoming_total = incoming_qty * incoming_unit_cost;
            let avg = roll_average_cost(
                Decimal::ZERO,
                Decimal::ZERO,
                incoming_qty,
                incoming_total,
            );
            // Division can introduce more decimal places than the inputs
            prop_assert_eq!(avg.round_dp(10), incoming_unit_cost.round_dp(10));
        }

        /// The batch-level weighted average lies between the cheapest and
        /// most expensive remaining batch
        #[test]
        fn prop_weighted_average_bounded(
            entries in prop::collection::vec(
                ((1i64..=10_000i64).prop_map(|n| Decimal::new(n, 2)), cost_strategy()),
                1..10
            )
        ) {
            let batches: Vec<BatchAvailability> = entries
                .iter()
                .enumerate()
                .map(|(i, (qty, cost))| BatchAvailability {
                    batch_id: Uuid::from_u128(i as u128 + 1),
                    quantity_remaining: *qty,
                    cost_per_unit: *cost,
                })
                .collect();

            let avg = weighted_average_cost(&batches);
            let min = entries.iter().map(|(_, c)| *c).min().unwrap();
            let max = entries.iter().map(|(_, c)| *c).max().unwrap();
            prop_assert!(avg >= min);
            prop_assert!(avg <= max);
        }
    }
}
