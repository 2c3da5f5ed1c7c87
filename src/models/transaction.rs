use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::live::query::Collection;
use crate::models::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// A single income or expense entry. `category` is a loose string key;
/// it is not checked against the category set, and deleting a category
/// leaves transactions that reference it untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub amount_cents: i64,
    #[serde(rename = "type")]
    pub kind: TxType,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Transaction {
    const COLLECTION: Collection = Collection::Transactions;

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

/// Form payload for creating or editing a transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub description: String,
    pub amount_cents: i64,
    #[serde(rename = "type")]
    pub kind: TxType,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub goal_id: Option<String>,
    /// Optional explicit timestamp, RFC 3339 or `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
}

fn default_category() -> String {
    "other".to_string()
}

impl NewTransaction {
    /// Entry-time validation. Amounts must be positive here; they are
    /// never re-validated on read.
    pub fn validate(&self) -> AppResult<()> {
        if self.description.trim().is_empty() {
            return Err(AppError::Validation("Description must not be empty".into()));
        }
        if self.amount_cents <= 0 {
            return Err(AppError::Validation("Amount must be positive".into()));
        }
        Ok(())
    }

    pub fn into_transaction(self, user_id: &str, now: DateTime<Utc>) -> AppResult<Transaction> {
        self.validate()?;

        let created_at = match &self.date {
            Some(raw) => crate::date_utils::parse_timestamp(raw)?,
            None => now,
        };

        Ok(Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            description: self.description.trim().to_string(),
            amount_cents: self.amount_cents,
            kind: self.kind,
            category: self.category,
            goal_id: self.goal_id.filter(|g| !g.is_empty()),
            created_at,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> NewTransaction {
        NewTransaction {
            description: "Groceries".into(),
            amount_cents: 4_500,
            kind: TxType::Expense,
            category: "food".into(),
            goal_id: None,
            date: None,
        }
    }

    #[test]
    fn rejects_non_positive_amount() {
        let mut tx = payload();
        tx.amount_cents = 0;
        assert!(tx.validate().is_err());
        tx.amount_cents = -100;
        assert!(tx.validate().is_err());
    }

    #[test]
    fn rejects_blank_description() {
        let mut tx = payload();
        tx.description = "   ".into();
        assert!(tx.validate().is_err());
    }

    #[test]
    fn explicit_date_overrides_now() {
        let now = Utc::now();
        let mut tx = payload();
        tx.date = Some("2024-01-15".into());
        let record = tx.into_transaction("u1", now).unwrap();
        assert_eq!(record.created_at.to_rfc3339(), "2024-01-15T00:00:00+00:00");
        assert_eq!(record.updated_at, now);
        assert_eq!(record.user_id, "u1");
    }
}
