//! Unit tests for the aggregation engine: pure derivations over
//! in-memory transaction lists with a pinned clock.

use chrono::{DateTime, Duration, TimeZone, Utc};
use fintrack::models::{builtin_categories, Budget, Goal, Transaction, TxType};
use fintrack::services::aggregate::{self, BudgetHealth, TimeRange};

fn pinned_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn tx(amount_cents: i64, kind: TxType, category: &str, created_at: DateTime<Utc>) -> Transaction {
    Transaction {
        id: format!("tx-{}-{}", category, amount_cents),
        user_id: "u1".into(),
        description: "test".into(),
        amount_cents,
        kind,
        category: category.into(),
        goal_id: None,
        created_at,
        updated_at: created_at,
    }
}

fn budget(category: &str, amount_cents: i64) -> Budget {
    let now = pinned_now();
    Budget {
        id: "b1".into(),
        user_id: "u1".into(),
        category: category.into(),
        amount_cents,
        name: "Budget".into(),
        created_at: now,
        updated_at: now,
    }
}

fn goal(target_amount_cents: i64, target_date: Option<DateTime<Utc>>) -> Goal {
    let now = pinned_now();
    Goal {
        id: "g1".into(),
        user_id: "u1".into(),
        name: "Goal".into(),
        target_amount_cents,
        target_date,
        description: String::new(),
        created_at: now,
        updated_at: now,
    }
}

/// A record exactly on the 7-day cutoff is retained; anything older is
/// excluded.
#[test]
fn filter_by_range_includes_boundary() {
    let now = pinned_now();
    let on_boundary = tx(100, TxType::Expense, "food", now - Duration::days(7));
    let just_inside = tx(200, TxType::Expense, "food", now - Duration::days(6));
    let just_outside = tx(
        300,
        TxType::Expense,
        "food",
        now - Duration::days(7) - Duration::milliseconds(1),
    );
    let records = vec![on_boundary, just_inside, just_outside];

    let filtered = aggregate::filter_by_range(&records, TimeRange::Days7, now);
    let amounts: Vec<i64> = filtered.iter().map(|t| t.amount_cents).collect();
    assert_eq!(amounts, vec![100, 200]);
}

/// `all` is the identity filter.
#[test]
fn filter_by_range_all_keeps_everything() {
    let now = pinned_now();
    let records = vec![
        tx(100, TxType::Expense, "food", now - Duration::days(900)),
        tx(200, TxType::Income, "salary", now),
    ];

    let filtered = aggregate::filter_by_range(&records, TimeRange::All, now);
    assert_eq!(filtered.len(), 2);
}

#[test]
fn sum_by_type_empty_is_zero() {
    assert_eq!(aggregate::sum_by_type(&[], TxType::Income), 0);
    assert_eq!(aggregate::sum_by_type(&[], TxType::Expense), 0);
}

#[test]
fn sum_by_type_only_counts_matching_kind() {
    let now = pinned_now();
    let records = vec![
        tx(1_000, TxType::Income, "salary", now),
        tx(300, TxType::Expense, "food", now),
        tx(200, TxType::Expense, "bills", now),
    ];

    assert_eq!(aggregate::sum_by_type(&records, TxType::Income), 1_000);
    assert_eq!(aggregate::sum_by_type(&records, TxType::Expense), 500);
}

/// When every record's category is known, the per-category totals
/// reconcile with the overall expense sum.
#[test]
fn group_by_category_totals_reconcile() {
    let now = pinned_now();
    let records = vec![
        tx(500, TxType::Expense, "food", now),
        tx(250, TxType::Expense, "food", now),
        tx(400, TxType::Expense, "transport", now),
        tx(10_000, TxType::Income, "salary", now),
    ];

    let grouped = aggregate::group_by_category(&records, builtin_categories());
    let grouped_total: i64 = grouped.iter().map(|c| c.amount_cents).sum();
    assert_eq!(grouped_total, aggregate::sum_by_type(&records, TxType::Expense));

    let food = grouped.iter().find(|c| c.category == "food").unwrap();
    assert_eq!(food.amount_cents, 750);
}

/// Records with unknown category keys are silently excluded, not
/// bucketed into "other". This is documented behavior.
#[test]
fn group_by_category_drops_unknown_keys() {
    let now = pinned_now();
    let records = vec![
        tx(500, TxType::Expense, "food", now),
        tx(999, TxType::Expense, "no-such-category", now),
    ];

    let grouped = aggregate::group_by_category(&records, builtin_categories());
    let grouped_total: i64 = grouped.iter().map(|c| c.amount_cents).sum();
    assert_eq!(grouped_total, 500);
    assert!(grouped.iter().all(|c| c.category != "no-such-category"));
}

/// Monthly buckets come back oldest first with locale "Mon YYYY" labels,
/// income and expense summed separately.
#[test]
fn monthly_trend_buckets_and_sorts() {
    let jan = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
    let feb = Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap();
    let records = vec![
        tx(200, TxType::Expense, "food", feb),
        tx(1_000, TxType::Income, "salary", jan),
        tx(300, TxType::Expense, "bills", jan),
    ];

    let trend = aggregate::monthly_trend(&records);
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].month, "Jan 2024");
    assert_eq!(trend[0].income_cents, 1_000);
    assert_eq!(trend[0].expense_cents, 300);
    assert_eq!(trend[1].month, "Feb 2024");
    assert_eq!(trend[1].expense_cents, 200);
}

/// 850 spent against a 1000 limit leaves 15% — below the 20% threshold,
/// so the budget is in warning.
#[test]
fn budget_status_warning_below_twenty_percent() {
    let now = pinned_now();
    let b = budget("food", 100_000);
    let records = vec![tx(85_000, TxType::Expense, "food", now - Duration::days(3))];

    let status = aggregate::budget_status(&b, &records, now);
    assert_eq!(status.spent_cents, 85_000);
    assert_eq!(status.remaining_cents, 15_000);
    assert_eq!(status.status, BudgetHealth::Warning);
}

#[test]
fn budget_status_over_when_limit_exceeded() {
    let now = pinned_now();
    let b = budget("food", 100_000);
    let records = vec![tx(100_001, TxType::Expense, "food", now)];

    let status = aggregate::budget_status(&b, &records, now);
    assert_eq!(status.status, BudgetHealth::Over);
    assert_eq!(status.remaining_cents, -1);
}

/// Spending from a previous month does not count against the current
/// month's budget window.
#[test]
fn budget_status_ignores_previous_months() {
    let now = pinned_now();
    let b = budget("food", 100_000);
    let last_month = Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap();
    let records = vec![
        tx(90_000, TxType::Expense, "food", last_month),
        tx(10_000, TxType::Expense, "food", now),
    ];

    let status = aggregate::budget_status(&b, &records, now);
    assert_eq!(status.spent_cents, 10_000);
    assert_eq!(status.status, BudgetHealth::OnTrack);
}

/// Expenses in other categories never count against the budget.
#[test]
fn budget_status_scoped_to_category() {
    let now = pinned_now();
    let b = budget("food", 100_000);
    let records = vec![tx(99_000, TxType::Expense, "transport", now)];

    let status = aggregate::budget_status(&b, &records, now);
    assert_eq!(status.spent_cents, 0);
    assert_eq!(status.status, BudgetHealth::OnTrack);
}

/// Progress clamps at 100% no matter how much extra income is tagged to
/// the goal.
#[test]
fn goal_progress_clamps_at_hundred() {
    let now = pinned_now();
    let g = goal(500_000, None);

    let mut saved = tx(500_000, TxType::Income, "salary", now);
    saved.goal_id = Some("g1".into());
    let mut extra = tx(250_000, TxType::Income, "salary", now);
    extra.goal_id = Some("g1".into());

    let progress = aggregate::goal_progress(&g, &[saved.clone()], now);
    assert_eq!(progress.percent, 100.0);

    let progress = aggregate::goal_progress(&g, &[saved, extra], now);
    assert_eq!(progress.saved_cents, 750_000);
    assert_eq!(progress.percent, 100.0);
}

/// Only income tagged with the goal's id counts as saved.
#[test]
fn goal_progress_requires_goal_tag() {
    let now = pinned_now();
    let g = goal(500_000, None);

    let mut other_goal = tx(100_000, TxType::Income, "salary", now);
    other_goal.goal_id = Some("g2".into());
    let mut expense = tx(100_000, TxType::Expense, "food", now);
    expense.goal_id = Some("g1".into());
    let untagged = tx(100_000, TxType::Income, "salary", now);

    let progress = aggregate::goal_progress(&g, &[other_goal, expense, untagged], now);
    assert_eq!(progress.saved_cents, 0);
    assert_eq!(progress.percent, 0.0);
}

/// Zero target must not divide by zero; days left round up and clamp.
#[test]
fn goal_progress_guards_and_days_left() {
    let now = pinned_now();

    let no_target = goal(0, None);
    let progress = aggregate::goal_progress(&no_target, &[], now);
    assert_eq!(progress.percent, 0.0);
    assert!(progress.days_left.is_none());

    let future = goal(100, Some(now + Duration::hours(36)));
    let progress = aggregate::goal_progress(&future, &[], now);
    assert_eq!(progress.days_left, Some(2));

    let past = goal(100, Some(now - Duration::days(10)));
    let progress = aggregate::goal_progress(&past, &[], now);
    assert_eq!(progress.days_left, Some(0));
}

/// Savings rate never produces NaN or infinities.
#[test]
fn savings_rate_guards_division_by_zero() {
    assert_eq!(aggregate::savings_rate(0, 500), 0.0);
    assert_eq!(aggregate::savings_rate(-100, 0), 0.0);
    assert!((aggregate::savings_rate(1_000, 800) - 20.0).abs() < f64::EPSILON);
    assert!(aggregate::savings_rate(1_000, 1_500) < 0.0);
}
