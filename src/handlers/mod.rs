pub mod analytics;
pub mod budgets;
pub mod categories;
pub mod events;
pub mod goals;
pub mod settings;
pub mod transactions;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Transaction CRUD
        .route("/api/transactions", get(transactions::list))
        .route("/api/transactions", post(transactions::create))
        .route("/api/transactions/:id", put(transactions::update))
        .route("/api/transactions/:id", delete(transactions::delete))
        // Budgets
        .route("/api/budgets", get(budgets::list))
        .route("/api/budgets", post(budgets::create))
        .route("/api/budgets/status", get(budgets::status))
        .route("/api/budgets/:id", put(budgets::update))
        .route("/api/budgets/:id", delete(budgets::delete))
        // Goals
        .route("/api/goals", get(goals::list))
        .route("/api/goals", post(goals::create))
        .route("/api/goals/progress", get(goals::progress))
        .route("/api/goals/:id", put(goals::update))
        .route("/api/goals/:id", delete(goals::delete))
        // Categories (built-ins merged with the user's custom ones)
        .route("/api/categories", get(categories::list))
        .route("/api/categories", post(categories::create))
        .route("/api/categories/:id", put(categories::update))
        .route("/api/categories/:id", delete(categories::delete))
        // Settings
        .route("/api/settings", get(settings::get))
        .route("/api/settings", put(settings::update))
        // Analytics (JSON for charts)
        .route("/api/analytics/summary", get(analytics::summary))
        .route(
            "/api/analytics/spending-by-category",
            get(analytics::spending_by_category),
        )
        .route("/api/analytics/monthly-trend", get(analytics::monthly_trend))
        // Live snapshot feeds
        .route("/api/live/:collection", get(events::stream))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
