use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use splitledger_approvals::{
    Approval, ApprovalKey, ApprovalNotice, ApprovalNotification, ApprovalPlan, DecideApproval, DecisionOutcome,
    LedgerSnapshot, NotificationKey, decide_approval, entity_status, pending_for, plan_expense_approvals,
    plan_payment_approvals,
};
use splitledger_core::{
    AggregateRoot, DomainError, EntityRef, ExpectedVersion, ExpenseId, PaymentId, UserId, ValidationErrors, Violation,
};
use splitledger_events::{EventBus, InMemoryEventBus, Subscription};
use splitledger_ledger::{
    BalanceDataset, Expense, ExpenseParticipant, Payment, validate_dataset, validate_rows,
};

use super::drafts::{ExpenseDraft, PaymentDraft};
use super::r#trait::{LedgerStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeSet<UserId>,
    expenses: Vec<Expense>,
    participants: Vec<ExpenseParticipant>,
    payments: Vec<Payment>,
    approvals: BTreeMap<ApprovalKey, Approval>,
    notifications: BTreeMap<NotificationKey, ApprovalNotification>,
}

impl Tables {
    fn check_known_user(&self, errors: &mut ValidationErrors, field: &str, user_id: &UserId) {
        if !user_id.is_blank() && !self.users.contains(user_id) {
            errors.push(Violation::new(field, format!("must reference a known user ({user_id})")));
        }
    }

    /// Insert unless a row with the same `(user, entity)` key exists; the
    /// existing row is left as it was.
    fn upsert_notification(&mut self, notification: ApprovalNotification) {
        self.notifications.entry(notification.key()).or_insert(notification);
    }

    fn insert_plan(&mut self, plan: ApprovalPlan) -> Option<ApprovalNotice> {
        for approval in plan.approvals {
            self.approvals.insert(approval.key().clone(), approval);
        }
        for notification in plan.notifications {
            self.upsert_notification(notification);
        }
        plan.notice
    }
}

/// In-memory ledger store for tests/dev and the CLI.
///
/// A single `RwLock` guards every table, so each write is one transaction.
/// Notices go out on the bus after the lock is released.
#[derive(Debug)]
pub struct InMemoryLedgerStore<B = InMemoryEventBus<ApprovalNotice>> {
    tables: RwLock<Tables>,
    bus: B,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::with_bus(InMemoryEventBus::new())
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> InMemoryLedgerStore<B>
where
    B: EventBus<ApprovalNotice>,
{
    pub fn with_bus(bus: B) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            bus,
        }
    }

    /// Seed the store with every row of `snapshot`.
    ///
    /// Keyed rows that repeat keep their first occurrence, the same as a
    /// notification insert against an existing key.
    pub fn from_snapshot(snapshot: LedgerSnapshot, bus: B) -> Self {
        let mut tables = Tables {
            users: snapshot.user_ids.into_iter().collect(),
            expenses: snapshot.expenses,
            participants: snapshot.participants,
            payments: snapshot.payments,
            ..Tables::default()
        };
        for approval in snapshot.approvals {
            tables.approvals.entry(approval.key().clone()).or_insert(approval);
        }
        for notification in snapshot.notifications {
            tables.upsert_notification(notification);
        }
        Self {
            tables: RwLock::new(tables),
            bus,
        }
    }

    pub fn register_user(&self, user_id: impl Into<UserId>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        tables.users.insert(user_id.into());
        Ok(())
    }

    /// Notices published by this store from now on.
    pub fn subscribe(&self) -> Subscription<ApprovalNotice> {
        self.bus.subscribe()
    }

    fn publish(&self, notice: ApprovalNotice) {
        let event_type = splitledger_events::Event::event_type(&notice);
        if let Err(err) = self.bus.publish(notice) {
            tracing::warn!(event_type, error = ?err, "failed to publish approval notice");
        }
    }
}

impl<B> LedgerStore for InMemoryLedgerStore<B>
where
    B: EventBus<ApprovalNotice>,
{
    fn create_expense(&self, draft: ExpenseDraft) -> Result<Expense, StoreError> {
        let expense = Expense {
            id: draft.id.unwrap_or_else(ExpenseId::generate),
            title: draft.title,
            amount_cents: draft.amount_cents,
            paid_by_id: draft.paid_by_id,
            is_settled: false,
            created_at: draft.created_at,
        };
        let participants: Vec<ExpenseParticipant> = draft
            .participants
            .into_iter()
            .map(|p| ExpenseParticipant {
                expense_id: expense.id.clone(),
                user_id: p.user_id,
                weight: p.weight,
            })
            .collect();

        let mut errors = ValidationErrors::new();
        if expense.title.trim().is_empty() {
            errors.push(Violation::new("Expense.title", "is required"));
        }
        for result in [
            validate_rows(std::slice::from_ref(&expense)),
            validate_rows(&participants),
            validate_dataset(&BalanceDataset {
                user_ids: vec![],
                expenses: vec![expense.clone()],
                participants: participants.clone(),
                payments: vec![],
            }),
        ] {
            if let Err(found) = result {
                errors.extend(found);
            }
        }

        let notice = {
            let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;

            tables.check_known_user(&mut errors, "Expense.paidById", &expense.paid_by_id);
            for p in &participants {
                tables.check_known_user(&mut errors, "Participant.userId", &p.user_id);
            }
            errors.into_result().map_err(DomainError::from)?;

            if tables.expenses.iter().any(|e| e.id == expense.id) {
                return Err(DomainError::conflict(format!("expense {} already exists", expense.id)).into());
            }

            let plan = plan_expense_approvals(&expense, &participants, expense.created_at);
            tracing::info!(
                expense_id = %expense.id,
                amount_cents = expense.amount_cents,
                participants = participants.len(),
                approvers = plan.approvers.len(),
                "created expense"
            );

            tables.expenses.push(expense.clone());
            tables.participants.extend(participants);
            tables.insert_plan(plan)
        };

        if let Some(notice) = notice {
            self.publish(notice);
        }
        Ok(expense)
    }

    fn create_payment(&self, draft: PaymentDraft) -> Result<Payment, StoreError> {
        let payment = Payment {
            id: draft.id.unwrap_or_else(PaymentId::generate),
            from_user_id: draft.from_user_id,
            to_user_id: draft.to_user_id,
            amount_cents: draft.amount_cents,
            created_at: draft.created_at,
            is_settled: false,
        };

        let mut errors = ValidationErrors::new();
        if let Err(found) = validate_rows(std::slice::from_ref(&payment)) {
            errors.extend(found);
        }

        let notice = {
            let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;

            tables.check_known_user(&mut errors, "Payment.fromUserId", &payment.from_user_id);
            tables.check_known_user(&mut errors, "Payment.toUserId", &payment.to_user_id);
            errors.into_result().map_err(DomainError::from)?;

            if tables.payments.iter().any(|p| p.id == payment.id) {
                return Err(DomainError::conflict(format!("payment {} already exists", payment.id)).into());
            }

            let plan = plan_payment_approvals(&payment, payment.created_at);
            tracing::info!(
                payment_id = %payment.id,
                amount_cents = payment.amount_cents,
                "created payment"
            );

            tables.payments.push(payment.clone());
            tables.insert_plan(plan)
        };

        if let Some(notice) = notice {
            self.publish(notice);
        }
        Ok(payment)
    }

    fn decide(&self, command: DecideApproval) -> Result<DecisionOutcome, StoreError> {
        let mut outcome = {
            let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
            let approvals: Vec<Approval> = tables
                .approvals
                .values()
                .filter(|a| a.entity() == &command.entity)
                .cloned()
                .collect();
            let notification: Vec<ApprovalNotification> = tables
                .notifications
                .get(&NotificationKey {
                    user_id: command.approver.clone(),
                    entity: command.entity.clone(),
                })
                .cloned()
                .into_iter()
                .collect();
            decide_approval(&approvals, &notification, &command)?
        };

        {
            let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;

            let stored = tables
                .approvals
                .get_mut(outcome.approval.key())
                .ok_or_else(|| DomainError::NotFound {
                    entity: command.entity.clone(),
                    approver: command.approver.clone(),
                })?;
            if ExpectedVersion::Exact(0).check(stored.version()).is_err() {
                tracing::warn!(approval = %outcome.approval.key(), "approval decided concurrently");
                return Err(DomainError::AlreadyDecided {
                    entity: command.entity.clone(),
                    approver: command.approver.clone(),
                }
                .into());
            }
            *stored = outcome.approval.clone();

            outcome.notification_resolved = tables
                .notifications
                .get_mut(&NotificationKey {
                    user_id: command.approver.clone(),
                    entity: command.entity.clone(),
                })
                .is_some_and(|n| n.resolve(command.occurred_at));
            if !outcome.notification_resolved {
                outcome.resolved_notification = None;
            }

            let rows: Vec<Approval> = tables
                .approvals
                .values()
                .filter(|a| a.entity() == &command.entity)
                .cloned()
                .collect();
            outcome.entity_status = entity_status(&rows, &command.entity);
        }

        tracing::info!(
            approval = %outcome.approval.key(),
            decision = ?command.decision,
            entity_status = %outcome.entity_status,
            "recorded approval decision"
        );
        self.publish(outcome.notice());
        Ok(outcome)
    }

    fn mark_expense_settled(&self, id: &ExpenseId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        let expense = tables
            .expenses
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| StoreError::UnknownEntity(EntityRef::Expense(id.clone())))?;
        expense.is_settled = true;
        tracing::info!(expense_id = %id, "marked expense settled");
        Ok(())
    }

    fn mark_payment_settled(&self, id: &PaymentId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        let payment = tables
            .payments
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::UnknownEntity(EntityRef::Payment(id.clone())))?;
        payment.is_settled = true;
        tracing::info!(payment_id = %id, "marked payment settled");
        Ok(())
    }

    fn snapshot(&self) -> Result<LedgerSnapshot, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(LedgerSnapshot {
            user_ids: tables.users.iter().cloned().collect(),
            expenses: tables.expenses.clone(),
            participants: tables.participants.clone(),
            payments: tables.payments.clone(),
            approvals: tables.approvals.values().cloned().collect(),
            notifications: tables.notifications.values().cloned().collect(),
        })
    }

    fn pending_notification_count(&self, user_id: &UserId) -> Result<usize, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .notifications
            .values()
            .filter(|n| n.is_pending() && &n.user_id == user_id)
            .count())
    }

    fn pending_notifications(&self, user_id: &UserId) -> Result<Vec<ApprovalNotification>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        let rows: Vec<ApprovalNotification> = tables.notifications.values().cloned().collect();
        Ok(pending_for(&rows, user_id).into_iter().cloned().collect())
    }
}
