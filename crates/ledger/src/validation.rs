//! Structural checks on raw rows, run before any computation.
//!
//! Both passes collect every violation instead of stopping at the first one:
//! callers surface the full list on their forms.

use std::collections::{BTreeMap, HashMap};

use splitledger_core::{ExpenseId, UserId, ValidationErrors, Violation};

use crate::model::{BalanceDataset, Expense, ExpenseParticipant, Payment};

/// `Ok(())` or every violated rule.
pub type ValidationResult = Result<(), ValidationErrors>;

/// Row-level rules for one row kind.
pub trait RowRules {
    /// Collection name used to locate violations (`expenses[3]`).
    const COLLECTION: &'static str;

    /// Violations of this row in isolation, without location.
    fn violations(&self) -> Vec<Violation>;
}

fn require_id(out: &mut Vec<Violation>, field: &str, blank: bool) {
    if blank {
        out.push(Violation::new(field, "is required"));
    }
}

impl RowRules for Expense {
    const COLLECTION: &'static str = "expenses";

    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        require_id(&mut out, "Expense.id", self.id.is_blank());
        require_id(&mut out, "Expense.paidById", self.paid_by_id.is_blank());
        if self.amount_cents <= 0 {
            out.push(Violation::new("Expense.amount", "must be > 0"));
        }
        out
    }
}

impl RowRules for ExpenseParticipant {
    const COLLECTION: &'static str = "participants";

    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        require_id(&mut out, "Participant.expenseId", self.expense_id.is_blank());
        require_id(&mut out, "Participant.userId", self.user_id.is_blank());
        if self.weight < 1 {
            out.push(Violation::new("Participant.weight", "must be >= 1"));
        }
        out
    }
}

impl RowRules for Payment {
    const COLLECTION: &'static str = "payments";

    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        require_id(&mut out, "Payment.id", self.id.is_blank());
        require_id(&mut out, "Payment.fromUserId", self.from_user_id.is_blank());
        require_id(&mut out, "Payment.toUserId", self.to_user_id.is_blank());
        if !self.from_user_id.is_blank() && self.from_user_id == self.to_user_id {
            out.push(Violation::new(
                "Payment.toUserId",
                "must differ from Payment.fromUserId",
            ));
        }
        if self.amount_cents <= 0 {
            out.push(Violation::new("Payment.amount", "must be > 0"));
        }
        out
    }
}

fn collect_rows<R: RowRules>(rows: &[R], errors: &mut ValidationErrors) {
    for (idx, row) in rows.iter().enumerate() {
        for violation in row.violations() {
            errors.push(violation.at(format!("{}[{idx}]", R::COLLECTION)));
        }
    }
}

/// Validate a list of rows of one kind.
pub fn validate_rows<R: RowRules>(rows: &[R]) -> ValidationResult {
    let mut errors = ValidationErrors::new();
    collect_rows(rows, &mut errors);
    errors.into_result()
}

/// Row-level pass over every collection of a dataset, violations merged.
pub fn validate_dataset_rows(dataset: &BalanceDataset) -> ValidationResult {
    let mut errors = ValidationErrors::new();
    collect_rows(&dataset.expenses, &mut errors);
    collect_rows(&dataset.participants, &mut errors);
    collect_rows(&dataset.payments, &mut errors);
    errors.into_result()
}

/// Cross-row invariants.
///
/// - every unsettled expense has at least one participant and positive total weight
/// - `(expense_id, user_id)` participant pairs are unique
pub fn validate_dataset(dataset: &BalanceDataset) -> ValidationResult {
    let mut errors = ValidationErrors::new();

    let mut first_seen: HashMap<(&ExpenseId, &UserId), usize> = HashMap::new();
    let mut weight_by_expense: BTreeMap<&ExpenseId, (usize, i128)> = BTreeMap::new();

    for (idx, p) in dataset.participants.iter().enumerate() {
        if let Some(first) = first_seen.get(&(&p.expense_id, &p.user_id)) {
            errors.push(
                Violation::new(
                    "Participant.userId",
                    format!(
                        "must be unique per expense ({} already listed at participants[{first}] for expense {})",
                        p.user_id, p.expense_id
                    ),
                )
                .at(format!("participants[{idx}]")),
            );
            continue;
        }
        first_seen.insert((&p.expense_id, &p.user_id), idx);

        let entry = weight_by_expense.entry(&p.expense_id).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += i128::from(p.weight);
    }

    for (idx, expense) in dataset.expenses.iter().enumerate() {
        if expense.is_settled {
            continue;
        }
        let location = format!("expenses[{idx}]");
        match weight_by_expense.get(&expense.id) {
            None => errors.push(
                Violation::new(
                    "Expense.participants",
                    format!("must not be empty for unsettled expense {}", expense.id),
                )
                .at(location),
            ),
            Some((_, total_weight)) if *total_weight <= 0 => errors.push(
                Violation::new(
                    "Expense.participants",
                    format!("must have total weight > 0 (expense {})", expense.id),
                )
                .at(location),
            ),
            Some(_) => {}
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn expense(id: &str, amount: i64, paid_by: &str) -> Expense {
        Expense {
            id: id.into(),
            title: format!("expense {id}"),
            amount_cents: amount,
            paid_by_id: paid_by.into(),
            is_settled: false,
            created_at: Utc::now(),
        }
    }

    fn participant(expense_id: &str, user_id: &str, weight: i64) -> ExpenseParticipant {
        ExpenseParticipant {
            expense_id: expense_id.into(),
            user_id: user_id.into(),
            weight,
        }
    }

    fn payment(from: &str, to: &str, amount: i64) -> Payment {
        Payment {
            id: "p1".into(),
            from_user_id: from.into(),
            to_user_id: to.into(),
            amount_cents: amount,
            created_at: Utc::now(),
            is_settled: false,
        }
    }

    #[test]
    fn valid_rows_pass() {
        assert!(validate_rows(&[expense("e1", 100, "a")]).is_ok());
        assert!(validate_rows(&[participant("e1", "a", 1)]).is_ok());
        assert!(validate_rows(&[payment("a", "b", 1)]).is_ok());
    }

    #[test]
    fn every_expense_violation_is_collected() {
        let rows = vec![expense("", 0, ""), expense("e2", -5, "a")];
        let errors = validate_rows(&rows).unwrap_err();
        let rendered: Vec<String> = errors.violations().iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "expenses[0]: Expense.id is required",
                "expenses[0]: Expense.paidById is required",
                "expenses[0]: Expense.amount must be > 0",
                "expenses[1]: Expense.amount must be > 0",
            ]
        );
    }

    #[test]
    fn participant_weight_must_be_at_least_one() {
        let errors = validate_rows(&[participant("e1", "a", 0)]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.violations()[0].field, "Participant.weight");
    }

    #[test]
    fn self_payment_and_non_positive_amount_reported_together() {
        let errors = validate_rows(&[payment("a", "a", 0)]).unwrap_err();
        let fields: Vec<&str> = errors.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["Payment.toUserId", "Payment.amount"]);
    }

    #[test]
    fn missing_payment_parties_do_not_count_as_self_payment() {
        let errors = validate_rows(&[payment("", "", 10)]).unwrap_err();
        let fields: Vec<&str> = errors.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["Payment.fromUserId", "Payment.toUserId"]);
    }

    #[test]
    fn dataset_rows_merge_all_collections() {
        let dataset = BalanceDataset {
            user_ids: vec![],
            expenses: vec![expense("e1", 0, "a")],
            participants: vec![participant("e1", "a", 0)],
            payments: vec![payment("a", "b", -1)],
        };
        let errors = validate_dataset_rows(&dataset).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn unsettled_expense_without_participants_is_rejected() {
        let dataset = BalanceDataset {
            user_ids: vec![],
            expenses: vec![expense("e1", 100, "a")],
            participants: vec![],
            payments: vec![],
        };
        let errors = validate_dataset(&dataset).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("must not be empty for unsettled expense e1"));
    }

    #[test]
    fn settled_expense_without_participants_is_fine() {
        let mut settled = expense("e1", 100, "a");
        settled.is_settled = true;
        let dataset = BalanceDataset {
            expenses: vec![settled],
            ..BalanceDataset::default()
        };
        assert!(validate_dataset(&dataset).is_ok());
    }

    #[test]
    fn duplicate_participant_pairs_are_rejected() {
        let dataset = BalanceDataset {
            user_ids: vec![],
            expenses: vec![expense("e1", 100, "a")],
            participants: vec![
                participant("e1", "b", 1),
                participant("e2", "b", 1),
                participant("e1", "b", 2),
            ],
            payments: vec![],
        };
        let errors = validate_dataset(&dataset).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.violations()[0].location.as_deref(), Some("participants[2]"));
    }

    #[test]
    fn dataset_pass_leaves_self_payment_to_the_row_pass() {
        let dataset = BalanceDataset {
            payments: vec![payment("a", "a", 100)],
            ..BalanceDataset::default()
        };
        assert!(validate_dataset(&dataset).is_ok());
        assert_eq!(validate_dataset_rows(&dataset).unwrap_err().len(), 1);
    }
}
