use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;

use crate::auth::CurrentUser;
use crate::db::documents;
use crate::error::{AppError, AppResult};
use crate::live::{Collection, LiveQuery, OrderBy};
use crate::models::category::{all_categories, slugify};
use crate::models::{Category, CustomCategory, NewCategory};
use crate::state::AppState;

pub(super) fn load_custom_categories(
    state: &AppState,
    user_id: &str,
) -> AppResult<Vec<CustomCategory>> {
    let conn = state.db.get()?;
    let query = LiveQuery::collection(Collection::Categories).order(OrderBy::CreatedAtAsc);
    Ok(documents::fetch_records(&conn, &query, user_id)?)
}

/// The merged category list: built-ins first, then the user's custom
/// categories.
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Category>>> {
    let custom = load_custom_categories(&state, &user.0)?;
    Ok(Json(all_categories(&custom)))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewCategory>,
) -> AppResult<(StatusCode, Json<CustomCategory>)> {
    let mut category = payload.into_category(&user.0, Utc::now())?;
    state.gateway.create(&mut category)?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<NewCategory>,
) -> AppResult<Json<CustomCategory>> {
    payload.validate()?;

    let conn = state.db.get()?;
    let existing = documents::get_document(&conn, Collection::Categories, &user.0, &id)?
        .ok_or_else(|| AppError::NotFound(format!("No category with id {}", id)))?;
    let mut category: CustomCategory = serde_json::from_value(existing)
        .map_err(|e| AppError::Internal(format!("Malformed stored category: {}", e)))?;
    drop(conn);

    category.name = payload.name.trim().to_string();
    category.slug = slugify(&category.name);
    if !payload.icon.is_empty() {
        category.icon = payload.icon;
    }
    if !payload.color.is_empty() {
        category.color = payload.color;
    }

    state.gateway.update(&mut category)?;
    Ok(Json(category))
}

/// Delete a custom category. Transactions referencing it keep their
/// category key; orphaned references are accepted, not cleaned up.
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let deleted = state.gateway.delete(Collection::Categories, &user.0, &id)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No category with id {}", id)))
    }
}
