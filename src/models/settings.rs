use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::live::query::Collection;
use crate::models::Record;

/// Per-user preferences, one document per user keyed by the user id and
/// written with upsert semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub user_id: String,
    pub theme: String,
    pub currency: String,
    pub language: String,
    pub notifications: bool,
    pub monthly_report: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSettings {
    pub fn defaults_for(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            theme: "dark".into(),
            currency: "INR".into(),
            language: "en".into(),
            notifications: true,
            monthly_report: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, leaving unspecified fields as they are.
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }
        if let Some(monthly_report) = patch.monthly_report {
            self.monthly_report = monthly_report;
        }
    }
}

impl Record for UserSettings {
    const COLLECTION: Collection = Collection::Settings;

    // The settings document id is the user id: one document per user.
    fn id(&self) -> &str {
        &self.user_id
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

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme: Option<String>,
    pub currency: Option<String>,
    pub language: Option<String>,
    pub notifications: Option<bool>,
    pub monthly_report: Option<bool>,
}
