//! Live query plumbing: declarative queries, the change event bus, and
//! the subscription manager that ties snapshots to callbacks.

pub mod broker;
pub mod manager;
pub mod query;

pub use broker::{ChangeBroker, ChangeEvent};
pub use manager::{Snapshot, SubscriptionHandle, SubscriptionManager};
pub use query::{Collection, FieldFilter, LiveQuery, OrderBy};
