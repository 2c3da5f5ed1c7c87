use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::live::query::Collection;
use crate::models::{category, Record};

/// A monthly spending limit for one category. The spent amount is never
/// stored; it is recomputed from the current month's transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub amount_cents: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Budget {
    const COLLECTION: Collection = Collection::Budgets;

    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub category: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub name: Option<String>,
}

impl NewBudget {
    pub fn validate(&self) -> AppResult<()> {
        if self.category.trim().is_empty() {
            return Err(AppError::Validation("Category must not be empty".into()));
        }
        if self.amount_cents <= 0 {
            return Err(AppError::Validation(
                "Budget amount must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn into_budget(self, user_id: &str, now: DateTime<Utc>) -> AppResult<Budget> {
        self.validate()?;

        // Fall back to the category's display name when no name was given.
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                category::builtin_categories()
                    .iter()
                    .find(|c| c.key == self.category)
                    .map(|c| c.name.to_string())
                    .unwrap_or_else(|| "Budget".to_string())
            });

        Ok(Budget {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            category: self.category,
            amount_cents: self.amount_cents,
            name,
            created_at: now,
            updated_at: now,
        })
    }
}
