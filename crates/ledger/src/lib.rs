//! `splitledger-ledger`: the pure ledger engine.
//!
//! Validation, proportional splitting, balance aggregation and settlement
//! planning over plain rows. No IO, no shared state: every call builds its
//! result from its arguments alone.

pub mod allocation;
pub mod balance;
pub mod model;
pub mod settlement;
pub mod split;
pub mod validation;

pub use allocation::{ShareRequest, allocate_weights};
pub use balance::calculate_balances;
pub use model::{
    BalanceDataset, Balances, Expense, ExpenseParticipant, ParticipantWeight, Payment, Shares, Transfer, Weighted,
};
pub use settlement::{apply_transfers, build_pairwise_debts};
pub use split::split_amount_by_weights;
pub use validation::{RowRules, ValidationResult, validate_dataset, validate_dataset_rows, validate_rows};
