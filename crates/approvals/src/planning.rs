//! Rows to create alongside a new expense or payment.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use splitledger_core::{Approvable, EntityRef, UserId};
use splitledger_ledger::{Expense, ExpenseParticipant, Payment};

use crate::approval::Approval;
use crate::notice::ApprovalNotice;
use crate::notification::ApprovalNotification;

/// Approval and notification rows for one new entity, plus the notice to send
/// once they are committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalPlan {
    pub entity: EntityRef,
    pub approvers: Vec<UserId>,
    pub approvals: Vec<Approval>,
    pub notifications: Vec<ApprovalNotification>,
    /// `None` when nobody has to approve.
    pub notice: Option<ApprovalNotice>,
}

impl ApprovalPlan {
    fn build(entity: EntityRef, requested_by: &UserId, approvers: BTreeSet<&UserId>, at: DateTime<Utc>) -> Self {
        let approvers: Vec<UserId> = approvers.into_iter().cloned().collect();

        let approvals = approvers
            .iter()
            .map(|user_id| Approval::pending(entity.clone(), user_id.clone()))
            .collect();
        let notifications = approvers
            .iter()
            .map(|user_id| ApprovalNotification::new(user_id.clone(), entity.clone(), at))
            .collect();
        let notice = (!approvers.is_empty()).then(|| ApprovalNotice::Requested {
            entity: entity.clone(),
            requested_by: requested_by.clone(),
            approvers: approvers.clone(),
            occurred_at: at,
        });

        Self {
            entity,
            approvers,
            approvals,
            notifications,
            notice,
        }
    }

    /// `true` when the entity counts toward balances right away.
    pub fn is_auto_approved(&self) -> bool {
        self.approvers.is_empty()
    }
}

/// Every distinct participant of `expense` other than its payer must approve.
/// Participant rows of other expenses are ignored.
pub fn plan_expense_approvals(
    expense: &Expense,
    participants: &[ExpenseParticipant],
    at: DateTime<Utc>,
) -> ApprovalPlan {
    let approvers: BTreeSet<&UserId> = participants
        .iter()
        .filter(|p| p.expense_id == expense.id && p.user_id != expense.paid_by_id)
        .map(|p| &p.user_id)
        .collect();

    ApprovalPlan::build(expense.entity_ref(), &expense.paid_by_id, approvers, at)
}

/// The recipient of a payment confirms they received it.
pub fn plan_payment_approvals(payment: &Payment, at: DateTime<Utc>) -> ApprovalPlan {
    let approvers: BTreeSet<&UserId> = std::iter::once(&payment.to_user_id)
        .filter(|to| **to != payment.from_user_id)
        .collect();

    ApprovalPlan::build(payment.entity_ref(), &payment.from_user_id, approvers, at)
}
