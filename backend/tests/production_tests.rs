//! Production workflow tests
//!
//! Tests for manufacturing-run completion including:
//! - Ingredient scaling against the planned quantity
//! - FIFO consumption feeding the weighted-average cost roll-up
//! - All-or-nothing semantics when an ingredient falls short

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::allocation::{allocation_cost, plan_allocation, BatchAvailability};
use shared::costing::roll_average_cost;
use shared::models::{scale_requirement, status_for_remainder, BatchStatus};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// In-memory run simulation (mirrors the transactional complete flow)
// ============================================================================

#[derive(Debug, Clone)]
struct SimBatch {
    id: Uuid,
    remaining: Decimal,
    cost: Decimal,
    status: BatchStatus,
}

#[derive(Debug, Clone)]
struct SimProduct {
    stock: i32,
    price_buy: Decimal,
}

#[derive(Debug, Clone)]
struct SimLedger {
    /// Batches per chemical, already in receipt order
    batches: Vec<(Uuid, Vec<SimBatch>)>,
    chemical_stock: Vec<(Uuid, Decimal)>,
    product: SimProduct,
    consumptions: Vec<(Uuid, Decimal, Decimal)>,
}

/// Complete a run: plan all ingredients first, then apply, exactly like the
/// transactional workflow. Returns the run's total batch cost.
fn simulate_complete(
    ledger: &mut SimLedger,
    ingredients: &[(Uuid, Decimal)],
    quantity_planned: i32,
) -> Result<Decimal, String> {
    if ingredients.is_empty() {
        return Err("Formula has no ingredients".to_string());
    }

    // Phase 1: plan everything against the current state
    let mut plans = Vec::new();
    for (chemical_id, quantity_required) in ingredients {
        let required = scale_requirement(*quantity_required, quantity_planned);
        let pool: Vec<BatchAvailability> = ledger
            .batches
            .iter()
            .find(|(id, _)| id == chemical_id)
            .map(|(_, batches)| {
                batches
                    .iter()
                    .filter(|b| b.status.is_allocatable() && b.remaining > Decimal::ZERO)
                    .map(|b| BatchAvailability {
                        batch_id: b.id,
                        quantity_remaining: b.remaining,
                        cost_per_unit: b.cost,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let plan = plan_allocation(&pool, required).map_err(|e| e.to_string())?;
        plans.push((*chemical_id, required, plan));
    }

    // Phase 2: apply
    let mut total_batch_cost = Decimal::ZERO;
    for (chemical_id, required, plan) in &plans {
        for slice in plan {
            let batches = &mut ledger
                .batches
                .iter_mut()
                .find(|(id, _)| id == chemical_id)
                .unwrap()
                .1;
            let batch = batches.iter_mut().find(|b| b.id == slice.batch_id).unwrap();
            batch.remaining -= slice.quantity_taken;
            batch.status = status_for_remainder(batch.remaining);

            ledger
                .consumptions
                .push((slice.batch_id, slice.quantity_taken, slice.cost_per_unit));
        }
        total_batch_cost += allocation_cost(plan);

        let stock = &mut ledger
            .chemical_stock
            .iter_mut()
            .find(|(id, _)| id == chemical_id)
            .unwrap()
            .1;
        *stock -= *required;
    }

    let produced = Decimal::from(quantity_planned);
    ledger.product.price_buy = roll_average_cost(
        Decimal::from(ledger.product.stock),
        ledger.product.price_buy,
        produced,
        total_batch_cost,
    );
    ledger.product.stock += quantity_planned;

    Ok(total_batch_cost)
}

fn single_chemical_ledger(chemical: Uuid, batches: Vec<SimBatch>) -> SimLedger {
    let stock: Decimal = batches
        .iter()
        .filter(|b| b.status.is_allocatable())
        .map(|b| b.remaining)
        .sum();
    SimLedger {
        batches: vec![(chemical, batches)],
        chemical_stock: vec![(chemical, stock)],
        product: SimProduct {
            stock: 0,
            price_buy: Decimal::ZERO,
        },
        consumptions: Vec::new(),
    }
}

fn sim_batch(id: u128, remaining: &str, cost: &str) -> SimBatch {
    SimBatch {
        id: Uuid::from_u128(id),
        remaining: dec(remaining),
        cost: dec(cost),
        status: BatchStatus::Active,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Ingredient needs scale linearly with the planned quantity
    #[test]
    fn test_requirement_scaling() {
        assert_eq!(scale_requirement(dec("0.8"), 8), dec("6.4"));
        assert_eq!(scale_requirement(dec("2"), 1), dec("2"));
        assert_eq!(scale_requirement(dec("0.25"), 100), dec("25"));
    }

    /// The full reference run: two batches, 8 units consumed, product
    /// bootstraps at 86 / 10 = 8.6
    #[test]
    fn test_reference_run() {
        let chemical = Uuid::from_u128(99);
        let mut ledger = single_chemical_ledger(
            chemical,
            vec![sim_batch(1, "5", "10"), sim_batch(2, "10", "12")],
        );

        // One ingredient at 0.8 per unit, 10 units planned -> 8 required
        let cost = simulate_complete(&mut ledger, &[(chemical, dec("0.8"))], 10).unwrap();

        assert_eq!(cost, dec("86"));

        let batches = &ledger.batches[0].1;
        assert_eq!(batches[0].remaining, Decimal::ZERO);
        assert_eq!(batches[0].status, BatchStatus::Depleted);
        assert_eq!(batches[1].remaining, dec("7"));
        assert_eq!(batches[1].status, BatchStatus::Active);

        assert_eq!(ledger.chemical_stock[0].1, dec("7"));
        assert_eq!(ledger.product.stock, 10);
        assert_eq!(ledger.product.price_buy, dec("8.6"));

        // One audit row per consumed batch
        assert_eq!(ledger.consumptions.len(), 2);
        assert_eq!(ledger.consumptions[0], (Uuid::from_u128(1), dec("5"), dec("10")));
        assert_eq!(ledger.consumptions[1], (Uuid::from_u128(2), dec("3"), dec("12")));
    }

    /// A second run blends into the existing average: (10 x 8.6 + 50) / 15
    #[test]
    fn test_second_run_blends_average() {
        let chemical = Uuid::from_u128(99);
        let mut ledger = single_chemical_ledger(chemical, vec![sim_batch(1, "100", "10")]);
        ledger.product = SimProduct {
            stock: 10,
            price_buy: dec("8.6"),
        };

        // 1 unit of chemical per product unit at cost 10 -> run cost 50
        simulate_complete(&mut ledger, &[(chemical, dec("1"))], 5).unwrap();

        assert_eq!(ledger.product.stock, 15);
        assert_eq!(ledger.product.price_buy.round_dp(6), dec("9.066667"));
    }

    /// An empty formula fails fast instead of completing with nothing
    #[test]
    fn test_empty_formula_rejected() {
        let chemical = Uuid::from_u128(99);
        let mut ledger = single_chemical_ledger(chemical, vec![sim_batch(1, "5", "10")]);

        assert!(simulate_complete(&mut ledger, &[], 10).is_err());
        assert_eq!(ledger.product.stock, 0);
    }

    /// A shortfall on the second ingredient leaves the first untouched
    #[test]
    fn test_shortfall_leaves_zero_writes() {
        let plentiful = Uuid::from_u128(1);
        let scarce = Uuid::from_u128(2);
        let mut ledger = SimLedger {
            batches: vec![
                (plentiful, vec![sim_batch(11, "100", "5")]),
                (scarce, vec![sim_batch(21, "3", "7")]),
            ],
            chemical_stock: vec![(plentiful, dec("100")), (scarce, dec("3"))],
            product: SimProduct {
                stock: 0,
                price_buy: Decimal::ZERO,
            },
            consumptions: Vec::new(),
        };
        let before = ledger.clone();

        // 10 units planned need 10 of each; the scarce chemical has 3
        let result = simulate_complete(
            &mut ledger,
            &[(plentiful, dec("1")), (scarce, dec("1"))],
            10,
        );

        assert!(result.is_err());
        // Planning happens before any apply, so nothing moved
        assert_eq!(ledger.batches[0].1[0].remaining, before.batches[0].1[0].remaining);
        assert_eq!(ledger.chemical_stock[0].1, before.chemical_stock[0].1);
        assert_eq!(ledger.product.stock, before.product.stock);
        assert!(ledger.consumptions.is_empty());
    }

    /// Quarantined batches never participate in a run
    #[test]
    fn test_quarantined_batches_skipped() {
        let chemical = Uuid::from_u128(99);
        let mut quarantined = sim_batch(1, "50", "1");
        quarantined.status = BatchStatus::Quarantine;
        let mut ledger =
            single_chemical_ledger(chemical, vec![quarantined, sim_batch(2, "10", "4")]);

        let cost = simulate_complete(&mut ledger, &[(chemical, dec("1"))], 8).unwrap();

        // Only the active batch was used, at its cost
        assert_eq!(cost, dec("32"));
        assert_eq!(ledger.batches[0].1[0].remaining, dec("50"));
        assert_eq!(ledger.batches[0].1[1].remaining, dec("2"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=20_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn cost_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn batches_strategy() -> impl Strategy<Value = Vec<SimBatch>> {
        prop::collection::vec((quantity_strategy(), cost_strategy()), 1..8).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (remaining, cost))| SimBatch {
                    id: Uuid::from_u128(i as u128 + 1),
                    remaining,
                    cost,
                    status: BatchStatus::Active,
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// After a successful run the chemical's batches lost exactly the
        /// required amount, and the cache agrees with the batch table
        #[test]
        fn prop_run_conserves_ingredient_stock(
            batches in batches_strategy(),
            per_unit in quantity_strategy(),
            planned in 1i32..20
        ) {
            let chemical = Uuid::from_u128(99);
            let before: Decimal = batches.iter().map(|b| b.remaining).sum();
            let mut ledger = single_chemical_ledger(chemical, batches);

            if simulate_complete(&mut ledger, &[(chemical, per_unit)], planned).is_ok() {
                let required = scale_requirement(per_unit, planned);
                let after: Decimal = ledger.batches[0].1.iter().map(|b| b.remaining).sum();

                prop_assert_eq!(after, before - required);
                // Cache stays consistent with the source of truth
                prop_assert_eq!(ledger.chemical_stock[0].1, after);
                // Depleted status tracks zero remainders exactly
                for b in &ledger.batches[0].1 {
                    prop_assert!(b.remaining >= Decimal::ZERO);
                    prop_assert_eq!(
                        b.status == BatchStatus::Depleted,
                        b.remaining.is_zero()
                    );
                }
            }
        }

        /// The product's new average cost stays within the unit-cost range
        /// of what was consumed (with zero prior stock)
        #[test]
        fn prop_new_cost_within_consumed_range(
            batches in batches_strategy(),
            per_unit in quantity_strategy(),
            planned in 1i32..20
        ) {
            let chemical = Uuid::from_u128(99);
            let mut ledger = single_chemical_ledger(chemical, batches);

            if simulate_complete(&mut ledger, &[(chemical, per_unit)], planned).is_ok() {
                let unit_costs: Vec<Decimal> = ledger
                    .consumptions
                    .iter()
                    .map(|(_, _, cost)| *cost)
                    .collect();
                let min = unit_costs.iter().min().unwrap();
                let max = unit_costs.iter().max().unwrap();
                let required = scale_requirement(per_unit, planned);
                let unit_cost_of_run =
                    ledger.product.price_buy * Decimal::from(planned) / required;

                // Per consumed-unit cost of the run is a weighted average of
                // the batch costs it drew from
                prop_assert!(unit_cost_of_run >= *min - dec("0.000001"));
                prop_assert!(unit_cost_of_run <= *max + dec("0.000001"));
            }
        }

        /// A failed run mutates nothing at all
        #[test]
        fn prop_failed_run_is_a_no_op(
            batches in batches_strategy(),
            per_unit in quantity_strategy(),
            planned in 1i32..20
        ) {
            let chemical = Uuid::from_u128(99);
            let available: Decimal = batches.iter().map(|b| b.remaining).sum();
            let required = scale_requirement(per_unit, planned);
            prop_assume!(required > available);

            let mut ledger = single_chemical_ledger(chemical, batches);
            let before = ledger.clone();

            prop_assert!(
                simulate_complete(&mut ledger, &[(chemical, per_unit)], planned).is_err()
            );
            let after_total: Decimal = ledger.batches[0].1.iter().map(|b| b.remaining).sum();
            let before_total: Decimal = before.batches[0].1.iter().map(|b| b.remaining).sum();
            prop_assert_eq!(after_total, before_total);
            prop_assert_eq!(ledger.product.stock, before.product.stock);
            prop_assert_eq!(ledger.product.price_buy, before.product.price_buy);
            prop_assert!(ledger.consumptions.is_empty());
        }
    }
}
