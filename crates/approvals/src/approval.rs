use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{Aggregate, AggregateRoot, DomainError, EntityRef, ExpectedVersion, UserId};
use splitledger_events::Event;

use crate::status::{ApprovalStatus, Decision};

/// Approval identifier: one row per approver per entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalKey {
    pub entity: EntityRef,
    pub user_id: UserId,
}

impl ApprovalKey {
    pub fn new(entity: EntityRef, user_id: UserId) -> Self {
        Self { entity, user_id }
    }
}

impl core::fmt::Display for ApprovalKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.user_id, self.entity)
    }
}

/// Aggregate root: Approval.
///
/// Starts `pending` and transitions exactly once, to `approved` or `rejected`.
/// The version is 0 while pending and 1 once decided, which is what the store's
/// compare-and-swap checks against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    #[serde(flatten)]
    key: ApprovalKey,
    status: ApprovalStatus,
    #[serde(default)]
    decided_at: Option<DateTime<Utc>>,
}

impl Approval {
    /// A fresh, undecided approval row.
    pub fn pending(entity: EntityRef, user_id: UserId) -> Self {
        Self {
            key: ApprovalKey::new(entity, user_id),
            status: ApprovalStatus::Pending,
            decided_at: None,
        }
    }

    pub fn key(&self) -> &ApprovalKey {
        &self.key
    }

    pub fn entity(&self) -> &EntityRef {
        &self.key.entity
    }

    pub fn user_id(&self) -> &UserId {
        &self.key.user_id
    }

    pub fn status(&self) -> ApprovalStatus {
        self.status
    }

    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}

impl AggregateRoot for Approval {
    type Id = ApprovalKey;

    fn id(&self) -> &Self::Id {
        &self.key
    }

    fn version(&self) -> u64 {
        if self.status.is_terminal() { 1 } else { 0 }
    }
}

/// Command: DecideApproval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideApproval {
    pub entity: EntityRef,
    pub approver: UserId,
    pub decision: Decision,
    pub occurred_at: DateTime<Utc>,
}

impl DecideApproval {
    pub fn key(&self) -> ApprovalKey {
        ApprovalKey::new(self.entity.clone(), self.approver.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalCommand {
    Decide(DecideApproval),
}

/// Event: ApprovalDecided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDecided {
    pub entity: EntityRef,
    pub approver: UserId,
    pub decision: Decision,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalEvent {
    Decided(ApprovalDecided),
}

impl Event for ApprovalEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ApprovalEvent::Decided(_) => "approvals.approval.decided",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ApprovalEvent::Decided(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Approval {
    type Command = ApprovalCommand;
    type Event = ApprovalEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ApprovalEvent::Decided(e) => {
                self.status = e.decision.into();
                self.decided_at = Some(e.occurred_at);
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ApprovalCommand::Decide(cmd) => self.handle_decide(cmd),
        }
    }
}

impl Approval {
    fn handle_decide(&self, cmd: &DecideApproval) -> Result<Vec<ApprovalEvent>, DomainError> {
        if self.key.entity != cmd.entity || self.key.user_id != cmd.approver {
            return Err(DomainError::NotFound {
                entity: cmd.entity.clone(),
                approver: cmd.approver.clone(),
            });
        }

        ExpectedVersion::Exact(0)
            .check(self.version())
            .map_err(|_| DomainError::AlreadyDecided {
                entity: cmd.entity.clone(),
                approver: cmd.approver.clone(),
            })?;

        Ok(vec![ApprovalEvent::Decided(ApprovalDecided {
            entity: cmd.entity.clone(),
            approver: cmd.approver.clone(),
            decision: cmd.decision,
            occurred_at: cmd.occurred_at,
        })])
    }
}
