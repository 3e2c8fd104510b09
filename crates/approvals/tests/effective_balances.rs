//! Approval decisions flowing through to balances.

use chrono::Utc;
use proptest::prelude::*;

use splitledger_approvals::{
    DecideApproval, Decision, LedgerSnapshot, decide_approval, effective_dataset, plan_expense_approvals,
    plan_payment_approvals,
};
use splitledger_core::{DomainError, EntityRef, UserId};
use splitledger_ledger::{Expense, ExpenseParticipant, Payment, calculate_balances};

fn snapshot_with_dinner() -> LedgerSnapshot {
    let expense = Expense {
        id: "dinner".into(),
        title: "Dinner".into(),
        amount_cents: 900,
        paid_by_id: "alice".into(),
        is_settled: false,
        created_at: Utc::now(),
    };
    let participants: Vec<ExpenseParticipant> = ["alice", "bob", "carol"]
        .into_iter()
        .map(|user_id| ExpenseParticipant {
            expense_id: "dinner".into(),
            user_id: user_id.into(),
            weight: 1,
        })
        .collect();
    let plan = plan_expense_approvals(&expense, &participants, Utc::now());

    LedgerSnapshot {
        user_ids: vec!["alice".into(), "bob".into(), "carol".into()],
        expenses: vec![expense],
        participants,
        payments: vec![],
        approvals: plan.approvals,
        notifications: plan.notifications,
    }
}

fn dinner() -> EntityRef {
    EntityRef::Expense("dinner".into())
}

fn apply_decision(
    snapshot: &mut LedgerSnapshot,
    entity: EntityRef,
    approver: &str,
    decision: Decision,
) -> Result<(), DomainError> {
    let command = DecideApproval {
        entity,
        approver: approver.into(),
        decision,
        occurred_at: Utc::now(),
    };
    let outcome = decide_approval(&snapshot.approvals, &snapshot.notifications, &command)?;
    for row in snapshot.approvals.iter_mut() {
        if row.key() == outcome.approval.key() {
            *row = outcome.approval.clone();
        }
    }
    if let Some(resolved) = outcome.resolved_notification {
        for row in snapshot.notifications.iter_mut() {
            if row.key() == resolved.key() {
                *row = resolved.clone();
            }
        }
    }
    Ok(())
}

fn balance(snapshot: &LedgerSnapshot, user: &str) -> i64 {
    let balances = calculate_balances(&effective_dataset(snapshot)).unwrap();
    balances[&UserId::from(user)]
}

#[test]
fn expense_counts_only_after_every_approval() {
    let mut snapshot = snapshot_with_dinner();
    assert_eq!(balance(&snapshot, "alice"), 0);

    apply_decision(&mut snapshot, dinner(), "bob", Decision::Approve).unwrap();
    assert_eq!(balance(&snapshot, "alice"), 0);

    apply_decision(&mut snapshot, dinner(), "carol", Decision::Approve).unwrap();
    assert_eq!(balance(&snapshot, "alice"), 600);
    assert_eq!(balance(&snapshot, "bob"), -300);
    assert!(snapshot.notifications.iter().all(|n| !n.is_pending()));
}

#[test]
fn payment_counts_once_the_recipient_confirms() {
    let mut snapshot = LedgerSnapshot {
        user_ids: vec!["alice".into(), "bob".into()],
        ..LedgerSnapshot::default()
    };
    let payment = Payment {
        id: "p1".into(),
        from_user_id: "bob".into(),
        to_user_id: "alice".into(),
        amount_cents: 250,
        created_at: Utc::now(),
        is_settled: false,
    };
    let plan = plan_payment_approvals(&payment, Utc::now());
    snapshot.payments.push(payment);
    snapshot.approvals.extend(plan.approvals);
    snapshot.notifications.extend(plan.notifications);

    assert_eq!(balance(&snapshot, "bob"), 0);

    apply_decision(&mut snapshot, EntityRef::Payment("p1".into()), "alice", Decision::Approve).unwrap();
    assert_eq!(balance(&snapshot, "bob"), 250);
    assert_eq!(balance(&snapshot, "alice"), -250);
}

#[test]
fn entity_without_approval_rows_counts_immediately() {
    let mut snapshot = snapshot_with_dinner();
    snapshot.approvals.clear();
    assert_eq!(balance(&snapshot, "alice"), 600);
}

#[test]
fn snapshot_round_trips_through_json() {
    let snapshot = snapshot_with_dinner();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: LedgerSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

proptest! {
    #[test]
    fn a_rejection_keeps_the_expense_out(order in Just(vec!["bob", "carol"]).prop_shuffle(), reject_idx in 0usize..2) {
        let mut snapshot = snapshot_with_dinner();
        for (idx, approver) in order.iter().enumerate() {
            let decision = if idx == reject_idx { Decision::Reject } else { Decision::Approve };
            apply_decision(&mut snapshot, dinner(), approver, decision).unwrap();
        }
        prop_assert!(effective_dataset(&snapshot).expenses.is_empty());

        for approver in &order {
            prop_assert!(apply_decision(&mut snapshot, dinner(), approver, Decision::Approve).is_err());
        }
        prop_assert!(effective_dataset(&snapshot).expenses.is_empty());
    }
}
