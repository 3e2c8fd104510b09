//! `splitledger-approvals`: the approval workflow gating expenses and payments.
//!
//! An expense or payment only counts toward balances once every required
//! approver said yes. This crate holds the approval aggregate, the rule that
//! folds individual decisions into an entity status, notification rows, and
//! the filter that turns a full snapshot into the rows that count.

pub mod approval;
pub mod notice;
pub mod notification;
pub mod planning;
pub mod snapshot;
pub mod status;
pub mod workflow;

pub use approval::{Approval, ApprovalCommand, ApprovalDecided, ApprovalEvent, ApprovalKey, DecideApproval};
pub use notice::ApprovalNotice;
pub use notification::{ApprovalNotification, NotificationKey, pending_for, pending_notification_count};
pub use planning::{ApprovalPlan, plan_expense_approvals, plan_payment_approvals};
pub use snapshot::{LedgerSnapshot, entity_status};
pub use status::{ApprovalStatus, Decision, NO_APPROVERS_REQUIRED, compute_approval_status};
pub use workflow::{DecisionOutcome, decide_approval, effective_dataset};
