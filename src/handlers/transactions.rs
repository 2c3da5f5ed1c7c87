use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::db::documents;
use crate::error::{AppError, AppResult};
use crate::live::{Collection, LiveQuery};
use crate::models::{NewTransaction, Transaction};
use crate::services::aggregate::{self, TimeRange};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub range: Option<String>,
}

pub(super) fn parse_range(raw: &Option<String>) -> AppResult<Option<TimeRange>> {
    match raw.as_deref() {
        None => Ok(None),
        Some(s) => TimeRange::parse(s)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown time range: {}", s))),
    }
}

/// Load a user's transactions, newest first, optionally range-filtered.
pub(super) fn load_transactions(
    state: &AppState,
    user_id: &str,
    range: Option<TimeRange>,
) -> AppResult<Vec<Transaction>> {
    let conn = state.db.get()?;
    let query = LiveQuery::collection(Collection::Transactions);
    let records: Vec<Transaction> = documents::fetch_records(&conn, &query, user_id)?;

    Ok(match range {
        Some(range) => aggregate::filter_by_range(&records, range, Utc::now()),
        None => records,
    })
}

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<Transaction>>> {
    let range = parse_range(&params.range)?;
    let records = load_transactions(&state, &user.0, range)?;
    Ok(Json(records))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewTransaction>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let mut transaction = payload.into_transaction(&user.0, Utc::now())?;
    state.gateway.create(&mut transaction)?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<NewTransaction>,
) -> AppResult<Json<Transaction>> {
    payload.validate()?;

    let conn = state.db.get()?;
    let existing = documents::get_document(&conn, Collection::Transactions, &user.0, &id)?
        .ok_or_else(|| AppError::NotFound(format!("No transaction with id {}", id)))?;
    let mut transaction: Transaction = serde_json::from_value(existing)
        .map_err(|e| AppError::Internal(format!("Malformed stored transaction: {}", e)))?;
    drop(conn);

    transaction.description = payload.description.trim().to_string();
    transaction.amount_cents = payload.amount_cents;
    transaction.kind = payload.kind;
    transaction.category = payload.category;
    transaction.goal_id = payload.goal_id.filter(|g| !g.is_empty());
    if let Some(raw) = &payload.date {
        transaction.created_at = crate::date_utils::parse_timestamp(raw)?;
    }

    state.gateway.update(&mut transaction)?;
    Ok(Json(transaction))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let deleted = state
        .gateway
        .delete(Collection::Transactions, &user.0, &id)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No transaction with id {}", id)))
    }
}
