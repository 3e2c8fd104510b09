//! Balances and settlement plan, composed from a fresh snapshot.

use serde::Serialize;

use splitledger_approvals::{LedgerSnapshot, effective_dataset};
use splitledger_core::{DomainError, DomainResult};
use splitledger_ledger::{Balances, Transfer, apply_transfers, build_pairwise_debts, calculate_balances};

/// What the balances page shows: who stands where, and who should pay whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub balances: Balances,
    pub transfers: Vec<Transfer>,
}

/// Approved rows → balances → greedy plan.
///
/// The plan is replayed against the balances before returning; a plan that
/// does not clear every balance is an `InternalConsistency` error.
pub fn build_dashboard(snapshot: &LedgerSnapshot) -> DomainResult<Dashboard> {
    let dataset = effective_dataset(snapshot);
    let balances = calculate_balances(&dataset)?;
    let transfers = build_pairwise_debts(&balances)?;

    let replayed = apply_transfers(&balances, &transfers)?;
    if let Some((user_id, left)) = replayed.iter().find(|(_, amount)| **amount != 0) {
        return Err(DomainError::consistency(format!(
            "settlement plan leaves {user_id} at {left}"
        )));
    }

    tracing::debug!(
        users = balances.len(),
        transfers = transfers.len(),
        "built dashboard"
    );
    Ok(Dashboard { balances, transfers })
}
