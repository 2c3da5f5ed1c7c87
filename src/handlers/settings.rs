use axum::extract::State;
use axum::response::Json;
use chrono::Utc;

use crate::auth::CurrentUser;
use crate::db::documents;
use crate::error::{AppError, AppResult};
use crate::live::Collection;
use crate::models::{SettingsPatch, UserSettings};
use crate::state::AppState;

fn load_settings(state: &AppState, user_id: &str) -> AppResult<UserSettings> {
    let conn = state.db.get()?;
    let stored = documents::get_document(&conn, Collection::Settings, user_id, user_id)?;

    match stored {
        Some(body) => serde_json::from_value(body)
            .map_err(|e| AppError::Internal(format!("Malformed stored settings: {}", e))),
        None => Ok(UserSettings::defaults_for(user_id, Utc::now())),
    }
}

/// The user's settings document, or the defaults if none was saved yet.
pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<UserSettings>> {
    Ok(Json(load_settings(&state, &user.0)?))
}

/// Partial update with merge-upsert semantics: absent fields keep their
/// current (or default) values.
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(patch): Json<SettingsPatch>,
) -> AppResult<Json<UserSettings>> {
    let mut settings = load_settings(&state, &user.0)?;
    settings.merge(patch);

    state.gateway.upsert(&mut settings)?;
    Ok(Json(settings))
}
