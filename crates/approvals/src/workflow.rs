//! Decisions and the effective view of the ledger they produce.

use std::collections::{BTreeMap, BTreeSet};

use splitledger_core::{Aggregate, Approvable, DomainError, DomainResult, EntityRef, ExpenseId};
use splitledger_ledger::BalanceDataset;

use crate::approval::{Approval, ApprovalCommand, ApprovalDecided, ApprovalEvent, DecideApproval};
use crate::notice::ApprovalNotice;
use crate::notification::ApprovalNotification;
use crate::snapshot::LedgerSnapshot;
use crate::status::{ApprovalStatus, compute_approval_status};

/// Result of a single decision. Nothing is written yet: the caller persists
/// `approval` (and `resolved_notification` when present) in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub approval: Approval,
    pub event: ApprovalDecided,
    /// Aggregate status of the entity with this decision taken into account.
    pub entity_status: ApprovalStatus,
    /// `false` when there was no notification or it was already resolved.
    pub notification_resolved: bool,
    pub resolved_notification: Option<ApprovalNotification>,
}

impl DecisionOutcome {
    pub fn notice(&self) -> ApprovalNotice {
        ApprovalNotice::Decided {
            entity: self.event.entity.clone(),
            approver: self.event.approver.clone(),
            decision: self.event.decision,
            entity_status: self.entity_status,
            occurred_at: self.event.occurred_at,
        }
    }
}

/// Decide the approval row of `command.approver` on `command.entity`.
///
/// Fails with `NotFound` when no such row exists and `AlreadyDecided` when it
/// is no longer pending.
pub fn decide_approval(
    approvals: &[Approval],
    notifications: &[ApprovalNotification],
    command: &DecideApproval,
) -> DomainResult<DecisionOutcome> {
    let key = command.key();
    let current = approvals
        .iter()
        .find(|a| a.key() == &key)
        .ok_or_else(|| DomainError::NotFound {
            entity: command.entity.clone(),
            approver: command.approver.clone(),
        })?;

    let mut approval = current.clone();
    let events = approval.handle(&ApprovalCommand::Decide(command.clone()))?;
    for event in &events {
        approval.apply(event);
    }
    let event = events
        .into_iter()
        .map(|ApprovalEvent::Decided(e)| e)
        .next()
        .ok_or_else(|| DomainError::consistency(format!("deciding {key} produced no event")))?;

    let entity_status = compute_approval_status(
        approvals
            .iter()
            .filter(|a| a.entity() == &command.entity)
            .map(|a| if a.key() == &key { approval.status() } else { a.status() }),
    );

    let resolved_notification = notifications
        .iter()
        .find(|n| n.matches(&command.approver, &command.entity))
        .cloned()
        .and_then(|mut n| n.resolve(command.occurred_at).then_some(n));

    tracing::debug!(
        approval = %key,
        decision = ?command.decision,
        entity_status = %entity_status,
        "decided approval"
    );

    Ok(DecisionOutcome {
        approval,
        event,
        entity_status,
        notification_resolved: resolved_notification.is_some(),
        resolved_notification,
    })
}

/// The rows that count toward balances: expenses and payments whose
/// aggregate status is approved, with the participants of kept expenses.
///
/// Pending entities are left out until their last approval arrives. Rejected
/// ones are left out for good.
pub fn effective_dataset(snapshot: &LedgerSnapshot) -> BalanceDataset {
    let mut statuses: BTreeMap<&EntityRef, Vec<ApprovalStatus>> = BTreeMap::new();
    for approval in &snapshot.approvals {
        statuses.entry(approval.entity()).or_default().push(approval.status());
    }
    let is_approved = |entity: &EntityRef| {
        let rows = statuses.get(entity).map(Vec::as_slice).unwrap_or_default();
        compute_approval_status(rows.iter().copied()) == ApprovalStatus::Approved
    };

    let expenses: Vec<_> = snapshot
        .expenses
        .iter()
        .filter(|e| is_approved(&e.entity_ref()))
        .cloned()
        .collect();
    let kept: BTreeSet<&ExpenseId> = expenses.iter().map(|e| &e.id).collect();
    let participants = snapshot
        .participants
        .iter()
        .filter(|p| kept.contains(&p.expense_id))
        .cloned()
        .collect();
    let payments: Vec<_> = snapshot
        .payments
        .iter()
        .filter(|p| is_approved(&p.entity_ref()))
        .cloned()
        .collect();

    tracing::debug!(
        expenses = expenses.len(),
        skipped_expenses = snapshot.expenses.len() - expenses.len(),
        payments = payments.len(),
        skipped_payments = snapshot.payments.len() - payments.len(),
        "filtered effective rows"
    );

    BalanceDataset {
        user_ids: snapshot.user_ids.clone(),
        expenses,
        participants,
        payments,
    }
}
