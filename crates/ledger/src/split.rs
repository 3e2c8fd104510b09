//! Deterministic proportional split of an amount into integer cents.
//!
//! Largest-remainder method: every participant receives the floor of its exact
//! proportional share, then the cents lost to flooring go one each to the
//! participants with the largest fractional parts. Ties go to the smaller
//! `UserId` (byte-wise order), so the same input always yields the same shares.

use std::collections::HashSet;

use splitledger_core::{DomainError, DomainResult, UserId, ValidationErrors, Violation};

use crate::model::{Shares, Weighted};

struct Portion<'a> {
    user_id: &'a UserId,
    base: i128,
    remainder: i128,
}

fn check_inputs<W: Weighted>(total_cents: i64, participants: &[W]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if total_cents <= 0 {
        errors.push(Violation::new("totalCents", "must be > 0"));
    }
    if participants.is_empty() {
        errors.push(Violation::new("participants", "must not be empty"));
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for (idx, p) in participants.iter().enumerate() {
        let location = format!("participants[{idx}]");
        if p.user_id().is_blank() {
            errors.push(Violation::new("Participant.userId", "is required").at(location.clone()));
        } else if !seen.insert(p.user_id()) {
            errors.push(
                Violation::new("Participant.userId", format!("must be unique ({} repeated)", p.user_id()))
                    .at(location.clone()),
            );
        }
        if p.weight() < 1 {
            errors.push(Violation::new("Participant.weight", "must be >= 1").at(location));
        }
    }

    errors.into_result()
}

/// Split `total_cents` across `participants` proportionally to their weights.
///
/// The result has one entry per participant and always sums to `total_cents`.
pub fn split_amount_by_weights<W: Weighted>(total_cents: i64, participants: &[W]) -> DomainResult<Shares> {
    check_inputs(total_cents, participants)?;

    let total = i128::from(total_cents);
    let total_weight: i128 = participants.iter().map(|p| i128::from(p.weight())).sum();
    if total_weight <= 0 {
        return Err(DomainError::validation("participants", "must have total weight > 0"));
    }

    let mut portions: Vec<Portion<'_>> = participants
        .iter()
        .map(|p| {
            let numerator = total * i128::from(p.weight());
            Portion {
                user_id: p.user_id(),
                base: numerator / total_weight,
                remainder: numerator % total_weight,
            }
        })
        .collect();

    let distributed: i128 = portions.iter().map(|p| p.base).sum();
    let leftover = total - distributed;
    if leftover < 0 || leftover >= portions.len() as i128 {
        return Err(DomainError::consistency(format!(
            "split of {total_cents} left {leftover} cents for {} participants",
            portions.len()
        )));
    }

    portions.sort_by(|a, b| b.remainder.cmp(&a.remainder).then_with(|| a.user_id.cmp(b.user_id)));

    let mut shares = Shares::new();
    for (rank, portion) in portions.iter().enumerate() {
        let bonus = i128::from((rank as i128) < leftover);
        let cents = i64::try_from(portion.base + bonus).map_err(|_| {
            DomainError::consistency(format!("share of {} does not fit in i64", portion.user_id))
        })?;
        shares.insert(portion.user_id.clone(), cents);
    }

    let sum: i128 = shares.values().copied().map(i128::from).sum();
    if sum != total {
        return Err(DomainError::consistency(format!(
            "split shares sum to {sum}, expected {total_cents}"
        )));
    }

    tracing::debug!(total_cents, participants = shares.len(), leftover = leftover as i64, "split amount");
    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParticipantWeight;
    use proptest::prelude::*;

    fn weights(pairs: &[(&str, i64)]) -> Vec<ParticipantWeight> {
        pairs.iter().map(|(id, w)| ParticipantWeight::new(*id, *w)).collect()
    }

    fn share(shares: &Shares, id: &str) -> i64 {
        shares[&UserId::from(id)]
    }

    #[test]
    fn larger_remainder_gets_the_extra_cent() {
        let shares = split_amount_by_weights(1001, &weights(&[("a", 1), ("b", 2)])).unwrap();
        assert_eq!(share(&shares, "a"), 334);
        assert_eq!(share(&shares, "b"), 667);
    }

    #[test]
    fn equal_remainders_break_ties_by_user_id() {
        let shares = split_amount_by_weights(100, &weights(&[("c", 1), ("b", 1), ("a", 1)])).unwrap();
        assert_eq!(share(&shares, "a"), 34);
        assert_eq!(share(&shares, "b"), 33);
        assert_eq!(share(&shares, "c"), 33);
    }

    #[test]
    fn tie_break_is_bytewise_not_numeric() {
        let shares = split_amount_by_weights(1, &weights(&[("9", 1), ("10", 1)])).unwrap();
        assert_eq!(share(&shares, "10"), 1);
        assert_eq!(share(&shares, "9"), 0);
    }

    #[test]
    fn weights_equal_to_cents_reproduce_the_cents() {
        let shares = split_amount_by_weights(1000, &weights(&[("a", 250), ("b", 750)])).unwrap();
        assert_eq!(share(&shares, "a"), 250);
        assert_eq!(share(&shares, "b"), 750);
    }

    #[test]
    fn single_participant_takes_everything() {
        let shares = split_amount_by_weights(999, &weights(&[("solo", 7)])).unwrap();
        assert_eq!(share(&shares, "solo"), 999);
    }

    #[test]
    fn amount_smaller_than_participant_count_still_sums() {
        let shares = split_amount_by_weights(2, &weights(&[("a", 1), ("b", 1), ("c", 1)])).unwrap();
        assert_eq!(shares.values().sum::<i64>(), 2);
        assert_eq!(share(&shares, "c"), 0);
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        let shares = split_amount_by_weights(i64::MAX, &weights(&[("a", i64::MAX), ("b", 1)])).unwrap();
        assert_eq!(
            shares.values().copied().map(i128::from).sum::<i128>(),
            i128::from(i64::MAX)
        );
    }

    #[test]
    fn invalid_input_reports_every_problem() {
        let err = split_amount_by_weights(0, &weights(&[("a", 0), ("a", 1)])).unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                let fields: Vec<&str> = errors.violations().iter().map(|v| v.field.as_str()).collect();
                assert_eq!(fields, vec!["totalCents", "Participant.weight", "Participant.userId"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_participants_are_rejected() {
        let err = split_amount_by_weights::<ParticipantWeight>(100, &[]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    fn arb_participants() -> impl Strategy<Value = Vec<ParticipantWeight>> {
        prop::collection::btree_map("[a-z]{1,6}", 1i64..10_000, 1..12)
            .prop_map(|m| m.into_iter().map(|(id, w)| ParticipantWeight::new(id, w)).collect())
    }

    proptest! {
        #[test]
        fn shares_always_sum_to_total(total in 1i64..10_000_000, participants in arb_participants()) {
            let shares = split_amount_by_weights(total, &participants).unwrap();
            prop_assert_eq!(shares.values().sum::<i64>(), total);
            prop_assert_eq!(shares.len(), participants.len());
            prop_assert!(shares.values().all(|v| *v >= 0));
        }

        #[test]
        fn input_order_does_not_matter(total in 1i64..10_000_000, participants in arb_participants()) {
            let forward = split_amount_by_weights(total, &participants).unwrap();
            let mut reversed = participants.clone();
            reversed.reverse();
            prop_assert_eq!(forward, split_amount_by_weights(total, &reversed).unwrap());
        }

        #[test]
        fn each_share_is_within_one_cent_of_exact(total in 1i64..10_000_000, participants in arb_participants()) {
            let shares = split_amount_by_weights(total, &participants).unwrap();
            let total_weight: i128 = participants.iter().map(|p| i128::from(p.weight)).sum();
            for p in &participants {
                let floor = i128::from(total) * i128::from(p.weight) / total_weight;
                let got = i128::from(shares[&p.user_id]);
                prop_assert!(got == floor || got == floor + 1);
            }
        }
    }
}
