//! Zero-sum balance aggregation over expenses and payments.

use std::collections::BTreeMap;

use splitledger_core::{DomainError, DomainResult, ExpenseId, UserId, ValidationErrors};

use crate::model::{Balances, BalanceDataset, ExpenseParticipant};
use crate::split::split_amount_by_weights;
use crate::validation::{validate_dataset, validate_dataset_rows};

fn credit(balances: &mut Balances, user_id: &UserId, delta: i64) -> DomainResult<()> {
    let entry = balances.entry(user_id.clone()).or_insert(0);
    *entry = entry
        .checked_add(delta)
        .ok_or_else(|| DomainError::consistency(format!("balance of {user_id} overflowed")))?;
    Ok(())
}

fn debit(balances: &mut Balances, user_id: &UserId, delta: i64) -> DomainResult<()> {
    let entry = balances.entry(user_id.clone()).or_insert(0);
    *entry = entry
        .checked_sub(delta)
        .ok_or_else(|| DomainError::consistency(format!("balance of {user_id} overflowed")))?;
    Ok(())
}

/// Compute the net balance of every user.
///
/// Both validation passes run first; their violations are merged into a single
/// `DomainError::Validation`. Settled expenses are skipped, payments always
/// count. Every id in `user_ids` appears in the result, other users are added
/// as they show up.
pub fn calculate_balances(dataset: &BalanceDataset) -> DomainResult<Balances> {
    let mut errors = ValidationErrors::new();
    if let Err(row_errors) = validate_dataset_rows(dataset) {
        errors.extend(row_errors);
    }
    if let Err(dataset_errors) = validate_dataset(dataset) {
        errors.extend(dataset_errors);
    }
    errors.into_result()?;

    let mut participants_by_expense: BTreeMap<&ExpenseId, Vec<&ExpenseParticipant>> = BTreeMap::new();
    for p in &dataset.participants {
        participants_by_expense.entry(&p.expense_id).or_default().push(p);
    }

    let mut balances: Balances = dataset.user_ids.iter().map(|id| (id.clone(), 0)).collect();

    let mut counted_expenses = 0usize;
    for expense in dataset.expenses.iter().filter(|e| !e.is_settled) {
        let participants = participants_by_expense
            .get(&expense.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let shares = split_amount_by_weights(expense.amount_cents, participants)?;

        balances.entry(expense.paid_by_id.clone()).or_insert(0);
        for (user_id, share) in &shares {
            if *user_id == expense.paid_by_id {
                continue;
            }
            credit(&mut balances, &expense.paid_by_id, *share)?;
            debit(&mut balances, user_id, *share)?;
        }
        counted_expenses += 1;
    }

    for payment in &dataset.payments {
        credit(&mut balances, &payment.from_user_id, payment.amount_cents)?;
        debit(&mut balances, &payment.to_user_id, payment.amount_cents)?;
    }

    let sum: i128 = balances.values().copied().map(i128::from).sum();
    if sum != 0 {
        return Err(DomainError::consistency(format!("balances sum to {sum}, expected 0")));
    }

    tracing::debug!(
        users = balances.len(),
        expenses = counted_expenses,
        payments = dataset.payments.len(),
        "calculated balances"
    );
    Ok(balances)
}
