//! Per-approver decisions and the status they add up to for an entity.

use serde::{Deserialize, Serialize};

/// Status of a single approval row, and of an approvable entity as a whole.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

impl core::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an approver answers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl From<Decision> for ApprovalStatus {
    fn from(value: Decision) -> Self {
        match value {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// Status of an entity nobody has to approve (e.g. the payer is the only
/// participant). Such an entity counts toward balances immediately.
pub const NO_APPROVERS_REQUIRED: ApprovalStatus = ApprovalStatus::Approved;

/// Aggregate status of one entity from the statuses of its approval rows.
///
/// A single rejection is final. Otherwise the entity is approved once every
/// row is approved, and pending until then.
pub fn compute_approval_status<I>(statuses: I) -> ApprovalStatus
where
    I: IntoIterator<Item = ApprovalStatus>,
{
    let mut any = false;
    let mut all_approved = true;

    for status in statuses {
        any = true;
        match status {
            ApprovalStatus::Rejected => return ApprovalStatus::Rejected,
            ApprovalStatus::Pending => all_approved = false,
            ApprovalStatus::Approved => {}
        }
    }

    if !any {
        NO_APPROVERS_REQUIRED
    } else if all_approved {
        ApprovalStatus::Approved
    } else {
        ApprovalStatus::Pending
    }
}
