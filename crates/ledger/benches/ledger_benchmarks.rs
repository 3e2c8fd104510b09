use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use splitledger_core::UserId;
use splitledger_ledger::{
    BalanceDataset, Expense, ExpenseParticipant, ParticipantWeight, Payment, build_pairwise_debts, calculate_balances,
    split_amount_by_weights,
};

fn user(idx: usize) -> UserId {
    UserId::from(format!("user-{idx:04}"))
}

/// Synthetic group: every expense is shared by a rotating window of users.
fn dataset(users: usize, expenses: usize) -> BalanceDataset {
    let mut dataset = BalanceDataset {
        user_ids: (0..users).map(user).collect(),
        ..BalanceDataset::default()
    };

    for e in 0..expenses {
        let id = format!("e{e}");
        dataset.expenses.push(Expense {
            id: id.as_str().into(),
            title: id.clone(),
            amount_cents: 1_000 + (e as i64 * 37) % 9_000,
            paid_by_id: user(e % users),
            is_settled: e % 10 == 0,
            created_at: Utc::now(),
        });
        for offset in 0..4.min(users) {
            dataset.participants.push(ExpenseParticipant {
                expense_id: id.as_str().into(),
                user_id: user((e + offset) % users),
                weight: 1 + offset as i64,
            });
        }
    }

    for p in 0..expenses / 4 {
        dataset.payments.push(Payment {
            id: format!("p{p}").into(),
            from_user_id: user(p % users),
            to_user_id: user((p + 1) % users),
            amount_cents: 250,
            created_at: Utc::now(),
            is_settled: false,
        });
    }

    dataset
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_amount_by_weights");

    for participants in [2usize, 10, 100, 1000] {
        let weights: Vec<ParticipantWeight> = (0..participants)
            .map(|i| ParticipantWeight::new(user(i), 1 + (i as i64 % 7)))
            .collect();
        group.throughput(Throughput::Elements(participants as u64));
        group.bench_with_input(BenchmarkId::from_parameter(participants), &weights, |b, weights| {
            b.iter(|| split_amount_by_weights(black_box(1_000_003), weights).unwrap());
        });
    }

    group.finish();
}

fn bench_balances(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_balances");

    for expenses in [10usize, 100, 1000] {
        let data = dataset(25, expenses);
        group.throughput(Throughput::Elements(expenses as u64));
        group.bench_with_input(BenchmarkId::from_parameter(expenses), &data, |b, data| {
            b.iter(|| calculate_balances(black_box(data)).unwrap());
        });
    }

    group.finish();
}

fn bench_settlement(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_pairwise_debts");

    for users in [5usize, 50, 500] {
        let balances = calculate_balances(&dataset(users, users * 4)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(users), &balances, |b, balances| {
            b.iter(|| build_pairwise_debts(black_box(balances)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_split, bench_balances, bench_settlement);
criterion_main!(benches);
