use std::sync::Arc;

use thiserror::Error;

use splitledger_approvals::{ApprovalNotification, DecideApproval, DecisionOutcome, LedgerSnapshot};
use splitledger_core::{DomainError, EntityRef, ExpenseId, PaymentId, UserId};
use splitledger_ledger::{Expense, Payment};

use super::drafts::{ExpenseDraft, PaymentDraft};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Validation failure, approval precondition, or engine bug.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("unknown {0}")]
    UnknownEntity(EntityRef),

    #[error("ledger store lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// The wrapped domain error, if any.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

/// Row store honoring the ledger's persistence boundaries.
///
/// - creating an entity inserts it with its participants, approvals and
///   notifications atomically, or not at all
/// - deciding an approval is a compare-and-swap on a pending row
/// - notifications are upserted on `(user, entity)`
pub trait LedgerStore: Send + Sync {
    fn create_expense(&self, draft: ExpenseDraft) -> Result<Expense, StoreError>;

    fn create_payment(&self, draft: PaymentDraft) -> Result<Payment, StoreError>;

    fn decide(&self, command: DecideApproval) -> Result<DecisionOutcome, StoreError>;

    fn mark_expense_settled(&self, id: &ExpenseId) -> Result<(), StoreError>;

    fn mark_payment_settled(&self, id: &PaymentId) -> Result<(), StoreError>;

    /// Consistent copy of every row.
    fn snapshot(&self) -> Result<LedgerSnapshot, StoreError>;

    fn pending_notification_count(&self, user_id: &UserId) -> Result<usize, StoreError>;

    /// Unresolved notifications of `user_id`, oldest first.
    fn pending_notifications(&self, user_id: &UserId) -> Result<Vec<ApprovalNotification>, StoreError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn create_expense(&self, draft: ExpenseDraft) -> Result<Expense, StoreError> {
        (**self).create_expense(draft)
    }

    fn create_payment(&self, draft: PaymentDraft) -> Result<Payment, StoreError> {
        (**self).create_payment(draft)
    }

    fn decide(&self, command: DecideApproval) -> Result<DecisionOutcome, StoreError> {
        (**self).decide(command)
    }

    fn mark_expense_settled(&self, id: &ExpenseId) -> Result<(), StoreError> {
        (**self).mark_expense_settled(id)
    }

    fn mark_payment_settled(&self, id: &PaymentId) -> Result<(), StoreError> {
        (**self).mark_payment_settled(id)
    }

    fn snapshot(&self) -> Result<LedgerSnapshot, StoreError> {
        (**self).snapshot()
    }

    fn pending_notification_count(&self, user_id: &UserId) -> Result<usize, StoreError> {
        (**self).pending_notification_count(user_id)
    }

    fn pending_notifications(&self, user_id: &UserId) -> Result<Vec<ApprovalNotification>, StoreError> {
        (**self).pending_notifications(user_id)
    }
}
