use axum::extract::{Query, State};
use axum::response::Json;
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::error::AppResult;
use crate::models::category::all_categories;
use crate::models::TxType;
use crate::services::aggregate::{self, CategorySpending, MonthlyTrend};
use crate::state::AppState;

use super::categories::load_custom_categories;
use super::transactions::{load_transactions, parse_range, ListParams};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_income_cents: i64,
    pub total_expense_cents: i64,
    pub balance_cents: i64,
    pub savings_rate: f64,
    pub transaction_count: usize,
}

/// Headline figures for the dashboard cards.
pub async fn summary(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Summary>> {
    let range = parse_range(&params.range)?;
    let records = load_transactions(&state, &user.0, range)?;

    let total_income_cents = aggregate::sum_by_type(&records, TxType::Income);
    let total_expense_cents = aggregate::sum_by_type(&records, TxType::Expense);

    Ok(Json(Summary {
        total_income_cents,
        total_expense_cents,
        balance_cents: total_income_cents - total_expense_cents,
        savings_rate: aggregate::savings_rate(total_income_cents, total_expense_cents),
        transaction_count: records.len(),
    }))
}

/// Expense totals per category for the pie chart. Transactions whose
/// category key matches no known category are excluded.
pub async fn spending_by_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<CategorySpending>>> {
    let range = parse_range(&params.range)?;
    let records = load_transactions(&state, &user.0, range)?;
    let custom = load_custom_categories(&state, &user.0)?;
    let categories = all_categories(&custom);

    Ok(Json(aggregate::group_by_category(&records, &categories)))
}

/// Month-by-month income and expense totals for the trend chart.
pub async fn monthly_trend(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<MonthlyTrend>>> {
    let range = parse_range(&params.range)?;
    let records = load_transactions(&state, &user.0, range)?;

    Ok(Json(aggregate::monthly_trend(&records)))
}
