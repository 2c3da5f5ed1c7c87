//! Pure, synchronous derivations over in-memory transaction snapshots.
//! Every dashboard figure comes from here; nothing in this module touches
//! the store or the clock (callers pass `now` explicitly).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::date_utils::{self, DAY_MS};
use crate::models::{Budget, Category, Goal, Transaction, TxType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Days7,
    #[default]
    Days30,
    Days90,
    All,
}

impl TimeRange {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "7d" => Some(Self::Days7),
            "30d" => Some(Self::Days30),
            "90d" => Some(Self::Days90),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days7 => "7d",
            Self::Days30 => "30d",
            Self::Days90 => "90d",
            Self::All => "all",
        }
    }

    fn days(&self) -> Option<i64> {
        match self {
            Self::Days7 => Some(7),
            Self::Days30 => Some(30),
            Self::Days90 => Some(90),
            Self::All => None,
        }
    }
}

/// Keep records whose timestamp is at or after `now - range`. Records
/// exactly on the cutoff are retained; `all` is the identity.
pub fn filter_by_range(
    records: &[Transaction],
    range: TimeRange,
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    let Some(days) = range.days() else {
        return records.to_vec();
    };

    let cutoff = now - chrono::Duration::milliseconds(days * DAY_MS);
    records
        .iter()
        .filter(|t| t.created_at >= cutoff)
        .cloned()
        .collect()
}

/// Sum of amounts for one transaction type. Empty input sums to zero.
pub fn sum_by_type(records: &[Transaction], kind: TxType) -> i64 {
    records
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.amount_cents)
        .sum()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpending {
    pub category: String,
    pub name: String,
    pub color: String,
    pub amount_cents: i64,
}

/// Expense totals per known category. Records whose category key matches
/// none of the given categories are dropped, not bucketed into "other";
/// empty buckets are omitted so charts skip zero slices.
pub fn group_by_category(records: &[Transaction], categories: &[Category]) -> Vec<CategorySpending> {
    categories
        .iter()
        .filter_map(|cat| {
            let amount_cents: i64 = records
                .iter()
                .filter(|t| t.kind == TxType::Expense && t.category == cat.key)
                .map(|t| t.amount_cents)
                .sum();

            (amount_cents > 0).then(|| CategorySpending {
                category: cat.key.clone(),
                name: cat.name.clone(),
                color: cat.color.clone(),
                amount_cents,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub month: String,
    pub income_cents: i64,
    pub expense_cents: i64,
}

/// Income and expense totals per calendar month, oldest first.
pub fn monthly_trend(records: &[Transaction]) -> Vec<MonthlyTrend> {
    let mut buckets: HashMap<(i32, u32), (String, i64, i64)> = HashMap::new();

    for t in records {
        let key = date_utils::month_key(t.created_at);
        let entry = buckets
            .entry(key)
            .or_insert_with(|| (date_utils::month_label(t.created_at), 0, 0));
        match t.kind {
            TxType::Income => entry.1 += t.amount_cents,
            TxType::Expense => entry.2 += t.amount_cents,
        }
    }

    let mut keyed: Vec<_> = buckets.into_iter().collect();
    keyed.sort_by_key(|(key, _)| *key);

    keyed
        .into_iter()
        .map(|(_, (month, income_cents, expense_cents))| MonthlyTrend {
            month,
            income_cents,
            expense_cents,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetHealth {
    OnTrack,
    Warning,
    Over,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub spent_cents: i64,
    pub remaining_cents: i64,
    pub status: BudgetHealth,
}

/// Spending against a budget within the current calendar month (day 1 to
/// now). Warning means less than 20% of the limit remains.
pub fn budget_status(budget: &Budget, records: &[Transaction], now: DateTime<Utc>) -> BudgetStatus {
    let month_start = date_utils::month_start(now);

    let spent_cents: i64 = records
        .iter()
        .filter(|t| {
            t.kind == TxType::Expense
                && t.category == budget.category
                && t.created_at >= month_start
        })
        .map(|t| t.amount_cents)
        .sum();

    let remaining_cents = budget.amount_cents - spent_cents;
    let status = if remaining_cents < 0 {
        BudgetHealth::Over
    } else if remaining_cents * 5 < budget.amount_cents {
        // remaining < 20% of the limit, in integer math
        BudgetHealth::Warning
    } else {
        BudgetHealth::OnTrack
    };

    BudgetStatus {
        spent_cents,
        remaining_cents,
        status,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub saved_cents: i64,
    pub percent: f64,
    pub days_left: Option<i64>,
}

/// Saved amount and completion for a goal: income transactions tagged
/// with the goal's id, clamped to 100% once the target is met.
pub fn goal_progress(goal: &Goal, records: &[Transaction], now: DateTime<Utc>) -> GoalProgress {
    let saved_cents: i64 = records
        .iter()
        .filter(|t| t.kind == TxType::Income && t.goal_id.as_deref() == Some(goal.id.as_str()))
        .map(|t| t.amount_cents)
        .sum();

    let percent = if goal.target_amount_cents > 0 {
        ((saved_cents as f64 / goal.target_amount_cents as f64) * 100.0).min(100.0)
    } else {
        0.0
    };

    GoalProgress {
        saved_cents,
        percent,
        days_left: goal
            .target_date
            .map(|target| date_utils::days_until(target, now)),
    }
}

/// Share of income left after expenses, as a percentage. Zero when there
/// is no income, never NaN or infinite.
pub fn savings_rate(income_cents: i64, expense_cents: i64) -> f64 {
    if income_cents <= 0 {
        return 0.0;
    }
    ((income_cents - expense_cents) as f64 / income_cents as f64) * 100.0
}
