//! Greedy pairwise settlement plan.
//!
//! Largest debtor pays largest creditor until one of them is cleared, then the
//! cursor moves on. Produces at most `n - 1` transfers for `n` non-zero
//! balances, but not necessarily the global minimum.

use std::cmp::Reverse;

use splitledger_core::{DomainError, DomainResult, UserId};

use crate::model::{Balances, Transfer};

struct Party<'a> {
    user_id: &'a UserId,
    remaining: u64,
}

fn ordered(mut parties: Vec<Party<'_>>) -> Vec<Party<'_>> {
    parties.sort_by_key(|p| (Reverse(p.remaining), p.user_id));
    parties
}

/// Build the transfers that bring every balance back to zero.
///
/// Expects a zero-sum map, as produced by `calculate_balances`. Zero balances
/// are ignored. The output is in generation order. A leg that cannot be
/// represented in cents is an `InternalConsistency` error, never skipped.
pub fn build_pairwise_debts(balances: &Balances) -> DomainResult<Vec<Transfer>> {
    let mut creditors = ordered(
        balances
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(user_id, amount)| Party {
                user_id,
                remaining: amount.unsigned_abs(),
            })
            .collect(),
    );
    let mut debtors = ordered(
        balances
            .iter()
            .filter(|(_, amount)| **amount < 0)
            .map(|(user_id, amount)| Party {
                user_id,
                remaining: amount.unsigned_abs(),
            })
            .collect(),
    );

    let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());
    let (mut ci, mut di) = (0usize, 0usize);

    while ci < creditors.len() && di < debtors.len() {
        let creditor = &mut creditors[ci];
        let debtor = &mut debtors[di];
        let amount = creditor.remaining.min(debtor.remaining);

        let amount_cents = i64::try_from(amount).map_err(|_| {
            DomainError::consistency(format!(
                "transfer of {amount} from {} to {} does not fit in i64",
                debtor.user_id, creditor.user_id
            ))
        })?;
        transfers.push(Transfer {
            from_user_id: debtor.user_id.clone(),
            to_user_id: creditor.user_id.clone(),
            amount_cents,
        });

        creditor.remaining -= amount;
        debtor.remaining -= amount;
        if creditor.remaining == 0 {
            ci += 1;
        }
        if debtor.remaining == 0 {
            di += 1;
        }
    }

    tracing::debug!(transfers = transfers.len(), "planned settlement");
    Ok(transfers)
}

/// Replay `transfers` on top of `balances`: the payer's balance goes up, the
/// recipient's goes down.
pub fn apply_transfers(balances: &Balances, transfers: &[Transfer]) -> DomainResult<Balances> {
    let mut replayed = balances.clone();
    for transfer in transfers {
        let from = replayed.entry(transfer.from_user_id.clone()).or_insert(0);
        *from = from.checked_add(transfer.amount_cents).ok_or_else(|| {
            DomainError::consistency(format!("replaying transfer overflowed {}", transfer.from_user_id))
        })?;
        let to = replayed.entry(transfer.to_user_id.clone()).or_insert(0);
        *to = to.checked_sub(transfer.amount_cents).ok_or_else(|| {
            DomainError::consistency(format!("replaying transfer overflowed {}", transfer.to_user_id))
        })?;
    }
    Ok(replayed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn balances(pairs: &[(&str, i64)]) -> Balances {
        pairs.iter().map(|(id, v)| (UserId::from(*id), *v)).collect()
    }

    fn legs(transfers: &[Transfer]) -> Vec<(&str, &str, i64)> {
        transfers
            .iter()
            .map(|t| (t.from_user_id.as_str(), t.to_user_id.as_str(), t.amount_cents))
            .collect()
    }

    #[test]
    fn largest_debtor_pays_first() {
        let plan = build_pairwise_debts(&balances(&[("a", 700), ("b", -300), ("c", -400)])).unwrap();
        assert_eq!(legs(&plan), vec![("c", "a", 400), ("b", "a", 300)]);
    }

    #[test]
    fn equal_amounts_order_by_user_id() {
        let plan = build_pairwise_debts(&balances(&[("y", 100), ("x", 100), ("b", -100), ("a", -100)])).unwrap();
        assert_eq!(legs(&plan), vec![("a", "x", 100), ("b", "y", 100)]);
    }

    #[test]
    fn one_debtor_spread_across_creditors() {
        let plan = build_pairwise_debts(&balances(&[("a", 300), ("b", 200), ("c", -500), ("d", 0)])).unwrap();
        assert_eq!(legs(&plan), vec![("c", "a", 300), ("c", "b", 200)]);
    }

    #[test]
    fn settled_ledger_needs_no_transfers() {
        assert!(build_pairwise_debts(&balances(&[("a", 0), ("b", 0)])).unwrap().is_empty());
        assert!(build_pairwise_debts(&Balances::new()).unwrap().is_empty());
    }

    #[test]
    fn extreme_balances_are_planned() {
        let plan = build_pairwise_debts(&balances(&[("a", i64::MAX), ("b", -i64::MAX)])).unwrap();
        assert_eq!(legs(&plan), vec![("b", "a", i64::MAX)]);
    }

    #[test]
    fn debtor_beyond_i64_max_still_gets_every_leg() {
        // |i64::MIN| does not fit in i64, but each leg is capped by a creditor.
        let plan = build_pairwise_debts(&balances(&[("a", i64::MAX), ("b", 1), ("c", i64::MIN)])).unwrap();
        assert_eq!(legs(&plan), vec![("c", "a", i64::MAX), ("c", "b", 1)]);
        let moved: i128 = plan.iter().map(|t| i128::from(t.amount_cents)).sum();
        assert_eq!(moved, i128::from(i64::MIN).abs());
    }

    #[test]
    fn replay_clears_the_plan() {
        let start = balances(&[("a", 700), ("b", -300), ("c", -400)]);
        let replayed = apply_transfers(&start, &build_pairwise_debts(&start).unwrap()).unwrap();
        assert!(replayed.values().all(|v| *v == 0));
    }

    fn arb_zero_sum() -> impl Strategy<Value = Balances> {
        prop::collection::btree_map("[a-h]{1,3}", -1_000_000i64..1_000_000, 1..10).prop_map(|mut map| {
            let sum: i64 = map.values().sum();
            map.insert("zz-balancer".to_string(), -sum);
            map.into_iter().map(|(id, v)| (UserId::from(id), v)).collect()
        })
    }

    proptest! {
        #[test]
        fn replaying_the_plan_zeroes_everything(start in arb_zero_sum()) {
            let plan = build_pairwise_debts(&start).unwrap();
            let replayed = apply_transfers(&start, &plan).unwrap();
            prop_assert!(replayed.values().all(|v| *v == 0));
        }

        #[test]
        fn plan_has_at_most_n_minus_one_legs(start in arb_zero_sum()) {
            let non_zero = start.values().filter(|v| **v != 0).count();
            let plan = build_pairwise_debts(&start).unwrap();
            prop_assert!(plan.len() <= non_zero.saturating_sub(1));
            prop_assert!(plan.iter().all(|t| t.amount_cents > 0 && t.from_user_id != t.to_user_id));
        }

        #[test]
        fn plan_is_deterministic(start in arb_zero_sum()) {
            prop_assert_eq!(build_pairwise_debts(&start).unwrap(), build_pairwise_debts(&start).unwrap());
        }
    }
}
