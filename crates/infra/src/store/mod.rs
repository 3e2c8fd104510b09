//! Row storage for expenses, payments and their approvals.

pub mod drafts;
pub mod in_memory;
pub mod r#trait;

pub use drafts::{ExpenseDraft, PaymentDraft};
pub use in_memory::InMemoryLedgerStore;
pub use r#trait::{LedgerStore, StoreError};
