use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::db::documents;
use crate::error::{AppError, AppResult};
use crate::live::{Collection, LiveQuery};
use crate::models::{Goal, NewGoal};
use crate::services::aggregate::{self, GoalProgress};
use crate::state::AppState;

use super::transactions::load_transactions;

pub(super) fn load_goals(state: &AppState, user_id: &str) -> AppResult<Vec<Goal>> {
    let conn = state.db.get()?;
    let query = LiveQuery::collection(Collection::Goals);
    Ok(documents::fetch_records(&conn, &query, user_id)?)
}

pub async fn list(State(state): State<AppState>, user: CurrentUser) -> AppResult<Json<Vec<Goal>>> {
    Ok(Json(load_goals(&state, &user.0)?))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewGoal>,
) -> AppResult<(StatusCode, Json<Goal>)> {
    let mut goal = payload.into_goal(&user.0, Utc::now())?;
    state.gateway.create(&mut goal)?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<NewGoal>,
) -> AppResult<Json<Goal>> {
    payload.validate()?;

    let conn = state.db.get()?;
    let existing = documents::get_document(&conn, Collection::Goals, &user.0, &id)?
        .ok_or_else(|| AppError::NotFound(format!("No goal with id {}", id)))?;
    let mut goal: Goal = serde_json::from_value(existing)
        .map_err(|e| AppError::Internal(format!("Malformed stored goal: {}", e)))?;
    drop(conn);

    goal.name = payload.name.trim().to_string();
    goal.target_amount_cents = payload.target_amount_cents;
    goal.description = payload.description;
    goal.target_date = match payload.target_date.as_deref().filter(|d| !d.is_empty()) {
        Some(raw) => Some(crate::date_utils::parse_timestamp(raw)?),
        None => None,
    };

    state.gateway.update(&mut goal)?;
    Ok(Json(goal))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let deleted = state.gateway.delete(Collection::Goals, &user.0, &id)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No goal with id {}", id)))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalWithProgress {
    #[serde(flatten)]
    pub goal: Goal,
    #[serde(flatten)]
    pub progress: GoalProgress,
}

/// Every goal with its derived saved amount and completion percentage.
pub async fn progress(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<GoalWithProgress>>> {
    let goals = load_goals(&state, &user.0)?;
    let transactions = load_transactions(&state, &user.0, None)?;
    let now = Utc::now();

    let progress = goals
        .into_iter()
        .map(|goal| {
            let progress = aggregate::goal_progress(&goal, &transactions, now);
            GoalWithProgress { goal, progress }
        })
        .collect();

    Ok(Json(progress))
}
