use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::db::documents;
use crate::error::{AppError, AppResult};
use crate::live::{Collection, LiveQuery, OrderBy};
use crate::models::{Budget, NewBudget};
use crate::services::aggregate::{self, BudgetStatus};
use crate::state::AppState;

use super::transactions::load_transactions;

pub(super) fn load_budgets(state: &AppState, user_id: &str) -> AppResult<Vec<Budget>> {
    let conn = state.db.get()?;
    let query = LiveQuery::collection(Collection::Budgets).order(OrderBy::CreatedAtAsc);
    Ok(documents::fetch_records(&conn, &query, user_id)?)
}

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Budget>>> {
    Ok(Json(load_budgets(&state, &user.0)?))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewBudget>,
) -> AppResult<(StatusCode, Json<Budget>)> {
    let mut budget = payload.into_budget(&user.0, Utc::now())?;
    state.gateway.create(&mut budget)?;
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<NewBudget>,
) -> AppResult<Json<Budget>> {
    payload.validate()?;

    let conn = state.db.get()?;
    let existing = documents::get_document(&conn, Collection::Budgets, &user.0, &id)?
        .ok_or_else(|| AppError::NotFound(format!("No budget with id {}", id)))?;
    let mut budget: Budget = serde_json::from_value(existing)
        .map_err(|e| AppError::Internal(format!("Malformed stored budget: {}", e)))?;
    drop(conn);

    budget.category = payload.category;
    budget.amount_cents = payload.amount_cents;
    if let Some(name) = payload.name.filter(|n| !n.trim().is_empty()) {
        budget.name = name;
    }

    state.gateway.update(&mut budget)?;
    Ok(Json(budget))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let deleted = state.gateway.delete(Collection::Budgets, &user.0, &id)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No budget with id {}", id)))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetWithStatus {
    #[serde(flatten)]
    pub budget: Budget,
    #[serde(flatten)]
    pub status: BudgetStatus,
}

/// Every budget with its derived current-month spending status.
pub async fn status(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<BudgetWithStatus>>> {
    let budgets = load_budgets(&state, &user.0)?;
    let transactions = load_transactions(&state, &user.0, None)?;
    let now = Utc::now();

    let statuses = budgets
        .into_iter()
        .map(|budget| {
            let status = aggregate::budget_status(&budget, &transactions, now);
            BudgetWithStatus { budget, status }
        })
        .collect();

    Ok(Json(statuses))
}
