use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::live::query::Collection;
use crate::models::Record;

/// A category as aggregation and presentation code sees it: either one
/// of the fixed built-ins or a user-defined custom category flattened
/// into the same shape.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub key: String,
    pub name: String,
    pub color: String,
}

/// The fixed built-in set every user starts with.
pub fn builtin_categories() -> &'static [Category] {
    use std::sync::OnceLock;

    static BUILTINS: OnceLock<Vec<Category>> = OnceLock::new();
    BUILTINS.get_or_init(|| {
        [
            ("food", "Food", "#10B981"),
            ("transport", "Transport", "#3B82F6"),
            ("bills", "Bills", "#F59E0B"),
            ("entertainment", "Entertainment", "#EC4899"),
            ("salary", "Salary", "#10B981"),
            ("other", "Other", "#6B7280"),
        ]
        .iter()
        .map(|(key, name, color)| Category {
            key: key.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect()
    })
}

/// A user-defined category document. Transactions reference it by slug
/// only; deleting the document leaves those references dangling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCategory {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomCategory {
    pub fn as_category(&self) -> Category {
        Category {
            key: self.slug.clone(),
            name: self.name.clone(),
            color: self.color.clone(),
        }
    }
}

impl Record for CustomCategory {
    const COLLECTION: Collection = Collection::Categories;

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

/// Built-ins plus the user's custom categories, in display order. A
/// custom category whose slug collides with an earlier key is skipped,
/// so every key maps to exactly one aggregation bucket.
pub fn all_categories(custom: &[CustomCategory]) -> Vec<Category> {
    let mut merged: Vec<Category> = builtin_categories().to_vec();
    for c in custom {
        if merged.iter().any(|existing| existing.key == c.slug) {
            continue;
        }
        merged.push(c.as_category());
    }
    merged
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_icon() -> String {
    "📁".to_string()
}

fn default_color() -> String {
    "#10B981".to_string()
}

impl NewCategory {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Category name must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn into_category(self, user_id: &str, now: DateTime<Utc>) -> AppResult<CustomCategory> {
        self.validate()?;

        let name = self.name.trim().to_string();
        Ok(CustomCategory {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            slug: slugify(&name),
            name,
            icon: if self.icon.is_empty() {
                default_icon()
            } else {
                self.icon
            },
            color: if self.color.is_empty() {
                default_color()
            } else {
                self.color
            },
            created_at: now,
            updated_at: now,
        })
    }
}

/// Lowercase, trim, collapse whitespace runs into single dashes.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_whitespace() {
        assert_eq!(slugify("  Side   Hustle "), "side-hustle");
        assert_eq!(slugify("Rent"), "rent");
    }

    #[test]
    fn merged_list_keeps_builtins_first() {
        let now = Utc::now();
        let custom = vec![NewCategory {
            name: "Pets".into(),
            icon: default_icon(),
            color: default_color(),
        }
        .into_category("u1", now)
        .unwrap()];

        let merged = all_categories(&custom);
        assert_eq!(merged.len(), builtin_categories().len() + 1);
        assert_eq!(merged[0].key, "food");
        assert_eq!(merged.last().unwrap().key, "pets");
    }

    #[test]
    fn merged_list_skips_shadowed_builtin_keys() {
        let now = Utc::now();
        // "Food" slugifies to "food", the builtin key
        let custom = vec![NewCategory {
            name: "Food".into(),
            icon: default_icon(),
            color: "#FF0000".into(),
        }
        .into_category("u1", now)
        .unwrap()];

        let merged = all_categories(&custom);
        assert_eq!(merged.len(), builtin_categories().len());
        assert_eq!(merged.iter().filter(|c| c.key == "food").count(), 1);
    }
}
