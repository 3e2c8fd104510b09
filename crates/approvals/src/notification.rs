//! "Needs your approval" rows, one per approver per entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{EntityRef, UserId};

/// Uniqueness key of a notification. Inserts with an existing key are no-ops.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationKey {
    pub user_id: UserId,
    pub entity: EntityRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalNotification {
    pub user_id: UserId,
    pub entity: EntityRef,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ApprovalNotification {
    pub fn new(user_id: UserId, entity: EntityRef, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            entity,
            created_at,
            resolved_at: None,
        }
    }

    pub fn key(&self) -> NotificationKey {
        NotificationKey {
            user_id: self.user_id.clone(),
            entity: self.entity.clone(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.resolved_at.is_none()
    }

    pub fn matches(&self, user_id: &UserId, entity: &EntityRef) -> bool {
        &self.user_id == user_id && &self.entity == entity
    }

    /// Mark as resolved. Returns `false` if it already was.
    pub fn resolve(&mut self, at: DateTime<Utc>) -> bool {
        if self.resolved_at.is_some() {
            return false;
        }
        self.resolved_at = Some(at);
        true
    }
}

/// Number of unresolved notifications addressed to `user_id`.
pub fn pending_notification_count(notifications: &[ApprovalNotification], user_id: &UserId) -> usize {
    notifications
        .iter()
        .filter(|n| n.is_pending() && &n.user_id == user_id)
        .count()
}

/// Unresolved notifications addressed to `user_id`, oldest first.
pub fn pending_for<'a>(notifications: &'a [ApprovalNotification], user_id: &UserId) -> Vec<&'a ApprovalNotification> {
    let mut pending: Vec<&ApprovalNotification> = notifications
        .iter()
        .filter(|n| n.is_pending() && &n.user_id == user_id)
        .collect();
    pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.entity.cmp(&b.entity)));
    pending
}
