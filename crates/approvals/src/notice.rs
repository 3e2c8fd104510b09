//! Messages for the notifier (email, in-app badge, ...), sent over an `EventBus`
//! after the rows they describe were committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{EntityRef, UserId};
use splitledger_events::Event;

use crate::status::{ApprovalStatus, Decision};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ApprovalNotice {
    /// A new entity waits for `approvers`.
    #[serde(rename_all = "camelCase")]
    Requested {
        entity: EntityRef,
        requested_by: UserId,
        approvers: Vec<UserId>,
        occurred_at: DateTime<Utc>,
    },
    /// `approver` decided; `entity_status` is the entity's status afterwards.
    #[serde(rename_all = "camelCase")]
    Decided {
        entity: EntityRef,
        approver: UserId,
        decision: Decision,
        entity_status: ApprovalStatus,
        occurred_at: DateTime<Utc>,
    },
}

impl ApprovalNotice {
    pub fn entity(&self) -> &EntityRef {
        match self {
            ApprovalNotice::Requested { entity, .. } | ApprovalNotice::Decided { entity, .. } => entity,
        }
    }
}

impl Event for ApprovalNotice {
    fn event_type(&self) -> &'static str {
        match self {
            ApprovalNotice::Requested { .. } => "approvals.notice.requested",
            ApprovalNotice::Decided { .. } => "approvals.notice.decided",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ApprovalNotice::Requested { occurred_at, .. } | ApprovalNotice::Decided { occurred_at, .. } => {
                *occurred_at
            }
        }
    }
}
