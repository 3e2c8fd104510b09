//! Plain rows consumed and produced by the engine.
//!
//! All money is integer cents (`i64`). Rows are snapshots handed over by the row
//! store; the engine never mutates them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{Approvable, Entity, EntityRef, ExpenseId, PaymentId, UserId};

/// Signed cents per user. Positive: is owed money. Negative: owes money.
pub type Balances = BTreeMap<UserId, i64>;

/// Integer cents per participant, as produced by the share splitter.
pub type Shares = BTreeMap<UserId, i64>;

/// An expense paid by one user on behalf of its participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    /// Positive amount in cents.
    pub amount_cents: i64,
    pub paid_by_id: UserId,
    /// Once settled, an expense stops affecting balances.
    pub is_settled: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Approvable for Expense {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::Expense(self.id.clone())
    }
}

/// One participant of one expense. `(expense_id, user_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseParticipant {
    pub expense_id: ExpenseId,
    pub user_id: UserId,
    /// Relative share unit (>= 1), not a currency amount.
    pub weight: i64,
}

/// A money transfer that already happened outside the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    /// Positive amount in cents.
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
    /// Informational only: payments always count toward balances.
    #[serde(default)]
    pub is_settled: bool,
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Approvable for Payment {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::Payment(self.id.clone())
    }
}

/// Splitter input: a user and their relative weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantWeight {
    pub user_id: UserId,
    pub weight: i64,
}

impl ParticipantWeight {
    pub fn new(user_id: impl Into<UserId>, weight: i64) -> Self {
        Self {
            user_id: user_id.into(),
            weight,
        }
    }
}

/// Anything the share splitter can split over.
pub trait Weighted {
    fn user_id(&self) -> &UserId;
    fn weight(&self) -> i64;
}

impl Weighted for ParticipantWeight {
    fn user_id(&self) -> &UserId {
        &self.user_id
    }

    fn weight(&self) -> i64 {
        self.weight
    }
}

impl Weighted for ExpenseParticipant {
    fn user_id(&self) -> &UserId {
        &self.user_id
    }

    fn weight(&self) -> i64 {
        self.weight
    }
}

impl<W: Weighted + ?Sized> Weighted for &W {
    fn user_id(&self) -> &UserId {
        (**self).user_id()
    }

    fn weight(&self) -> i64 {
        (**self).weight()
    }
}

/// Everything the balance aggregator needs, already filtered to effective rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDataset {
    /// Users that always appear in the result, even at 0.
    #[serde(default)]
    pub user_ids: Vec<UserId>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub participants: Vec<ExpenseParticipant>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

/// One leg of a settlement plan: `from_user_id` pays `to_user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub amount_cents: i64,
}
