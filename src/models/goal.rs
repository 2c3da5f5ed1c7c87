use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::live::query::Collection;
use crate::models::Record;

/// A savings goal. The saved amount is derived from income transactions
/// tagged with this goal's id, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub target_amount_cents: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Goal {
    const COLLECTION: Collection = Collection::Goals;

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
pub struct NewGoal {
    pub name: String,
    pub target_amount_cents: i64,
    /// RFC 3339 or `YYYY-MM-DD`; empty string counts as absent.
    #[serde(default)]
    pub target_date: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl NewGoal {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Goal name must not be empty".into()));
        }
        if self.target_amount_cents <= 0 {
            return Err(AppError::Validation(
                "Target amount must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn into_goal(self, user_id: &str, now: DateTime<Utc>) -> AppResult<Goal> {
        self.validate()?;

        let target_date = match self.target_date.as_deref().filter(|d| !d.is_empty()) {
            Some(raw) => Some(crate::date_utils::parse_timestamp(raw)?),
            None => None,
        };

        Ok(Goal {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: self.name.trim().to_string(),
            target_amount_cents: self.target_amount_cents,
            target_date,
            description: self.description,
            created_at: now,
            updated_at: now,
        })
    }
}
