//! Domain error model.

use serde::Serialize;
use thiserror::Error;

use crate::id::{EntityRef, UserId};

/// Result type used across the ledger engine.
pub type DomainResult<T> = Result<T, DomainError>;

/// A single violated rule, located by collection and row index when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Collection name and row index, e.g. `expenses[2]`; `None` for input-level rules.
    pub location: Option<String>,
    /// Field (or pair of fields) the rule applies to, e.g. `Expense.amount`.
    pub field: String,
    /// What the rule requires, e.g. `must be > 0`.
    pub rule: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            location: None,
            field: field.into(),
            rule: rule.into(),
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl core::fmt::Display for Violation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {} {}", self.field, self.rule),
            None => write!(f, "{} {}", self.field, self.rule),
        }
    }
}

/// Every violation found by a validation pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    /// `Ok(())` when nothing was collected, otherwise the collected list.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<Violation> for ValidationErrors {
    fn from(value: Violation) -> Self {
        Self(vec![value])
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (idx, violation) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic ledger failures. Storage and transport
/// concerns wrap it in their own error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input rows failed validation. Recoverable; lists every violated rule.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// A postcondition of the engine itself failed. Indicates a logic bug.
    #[error("internal consistency violated: {0}")]
    InternalConsistency(String),

    /// The approver already decided on this entity.
    #[error("approval by {approver} on {entity} was already decided")]
    AlreadyDecided { entity: EntityRef, approver: UserId },

    /// No approval row exists for this entity/approver combination.
    #[error("no approval by {approver} on {entity}")]
    NotFound { entity: EntityRef, approver: UserId },

    /// Optimistic concurrency mismatch.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    /// Single-violation validation error.
    pub fn validation(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::Validation(Violation::new(field, rule).into())
    }

    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::InternalConsistency(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Fatal errors indicate a bug and must never be shown as user mistakes.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InternalConsistency(_))
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}
