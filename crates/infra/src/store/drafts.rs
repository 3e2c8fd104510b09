//! Input for creating expenses and payments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{DomainResult, ExpenseId, PaymentId, UserId};
use splitledger_ledger::{ParticipantWeight, ShareRequest, allocate_weights};

/// A new expense as entered by its payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    /// Generated when absent.
    #[serde(default)]
    pub id: Option<ExpenseId>,
    pub title: String,
    pub amount_cents: i64,
    pub paid_by_id: UserId,
    pub participants: Vec<ParticipantWeight>,
    pub created_at: DateTime<Utc>,
}

impl ExpenseDraft {
    /// Draft whose weights come from pinned shares and an equal split of the rest.
    pub fn from_share_requests(
        title: impl Into<String>,
        amount_cents: i64,
        paid_by_id: impl Into<UserId>,
        requests: &[ShareRequest],
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: None,
            title: title.into(),
            amount_cents,
            paid_by_id: paid_by_id.into(),
            participants: allocate_weights(Some(amount_cents), requests)?,
            created_at,
        })
    }

    pub fn with_id(mut self, id: impl Into<ExpenseId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A payment recorded by the payer, to be confirmed by the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    #[serde(default)]
    pub id: Option<PaymentId>,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl PaymentDraft {
    pub fn new(
        from_user_id: impl Into<UserId>,
        to_user_id: impl Into<UserId>,
        amount_cents: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            from_user_id: from_user_id.into(),
            to_user_id: to_user_id.into(),
            amount_cents,
            created_at,
        }
    }

    pub fn with_id(mut self, id: impl Into<PaymentId>) -> Self {
        self.id = Some(id.into());
        self
    }
}
