use serde::{Deserialize, Serialize};

use splitledger_core::{EntityRef, UserId};
use splitledger_ledger::{Expense, ExpenseParticipant, Payment};

use crate::approval::Approval;
use crate::notification::ApprovalNotification;
use crate::status::{ApprovalStatus, compute_approval_status};

/// Every row the engine is handed, as read from the row store in one go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub user_ids: Vec<UserId>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub participants: Vec<ExpenseParticipant>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub approvals: Vec<Approval>,
    #[serde(default)]
    pub notifications: Vec<ApprovalNotification>,
}

impl LedgerSnapshot {
    /// Aggregate approval status of `entity` from its rows in this snapshot.
    pub fn entity_status(&self, entity: &EntityRef) -> ApprovalStatus {
        entity_status(&self.approvals, entity)
    }
}

/// Aggregate status of `entity` over the matching rows of `approvals`.
pub fn entity_status(approvals: &[Approval], entity: &EntityRef) -> ApprovalStatus {
    compute_approval_status(
        approvals
            .iter()
            .filter(|a| a.entity() == entity)
            .map(Approval::status),
    )
}
