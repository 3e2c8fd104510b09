//! Strongly-typed identifiers used across the ledger.
//!
//! Identifiers are opaque strings owned by external collaborators (user directory,
//! row store). Ordering is plain byte-wise string ordering, which is what every
//! deterministic tie-break in the engine relies on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a user (participant, payer, approver).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifier of an expense row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

/// Identifier of a payment row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl $t {
            /// Generate a fresh identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// `true` when the identifier is empty or whitespace only (a missing id).
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_newtype!(UserId);
impl_string_newtype!(ExpenseId);
impl_string_newtype!(PaymentId);

/// Kind of entity an approval or notification refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Expense,
    Payment,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Expense => "expense",
            EntityKind::Payment => "payment",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an approvable entity (an expense or a payment).
///
/// Serialized as `{"entityType": "expense", "entityId": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "entityType", content = "entityId", rename_all = "lowercase")]
pub enum EntityRef {
    Expense(ExpenseId),
    Payment(PaymentId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Expense(_) => EntityKind::Expense,
            EntityRef::Payment(_) => EntityKind::Payment,
        }
    }

    pub fn id_str(&self) -> &str {
        match self {
            EntityRef::Expense(id) => id.as_str(),
            EntityRef::Payment(id) => id.as_str(),
        }
    }
}

impl core::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id_str())
    }
}

impl From<ExpenseId> for EntityRef {
    fn from(value: ExpenseId) -> Self {
        EntityRef::Expense(value)
    }
}

impl From<PaymentId> for EntityRef {
    fn from(value: PaymentId) -> Self {
        EntityRef::Payment(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_order_bytewise_not_numerically() {
        let mut ids: Vec<UserId> = ["10", "9", "B", "a", "A"].into_iter().map(UserId::from).collect();
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(UserId::as_str).collect();
        assert_eq!(sorted, vec!["10", "9", "A", "B", "a"]);
    }

    #[test]
    fn blank_ids_are_detected() {
        assert!(UserId::from("").is_blank());
        assert!(UserId::from("   ").is_blank());
        assert!(!UserId::generate().is_blank());
    }

    #[test]
    fn entity_ref_serializes_with_type_tag() {
        let entity = EntityRef::from(ExpenseId::from("e1"));
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json, serde_json::json!({"entityType": "expense", "entityId": "e1"}));
        assert_eq!(entity.to_string(), "expense:e1");
    }
}
