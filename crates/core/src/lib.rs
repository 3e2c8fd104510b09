//! `splitledger-core`: shared building blocks for the ledger engine.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::{Approvable, Entity};
pub use error::{DomainError, DomainResult, ValidationErrors, Violation};
pub use id::{EntityKind, EntityRef, ExpenseId, PaymentId, UserId};
