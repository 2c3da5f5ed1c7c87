pub mod budget;
pub mod category;
pub mod goal;
pub mod settings;
pub mod transaction;

pub use budget::{Budget, NewBudget};
pub use category::{all_categories, builtin_categories, Category, CustomCategory, NewCategory};
pub use goal::{Goal, NewGoal};
pub use settings::{SettingsPatch, UserSettings};
pub use transaction::{NewTransaction, Transaction, TxType};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::live::query::Collection;

/// A typed document stored in one of the collections. Implementors carry
/// their own id, owner and timestamps inside the serialized body; the
/// store mirrors those into indexed columns.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn user_id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;

    /// Refresh the modification timestamp. Called by the mutation
    /// gateway on every write.
    fn touch(&mut self, now: DateTime<Utc>);
}
