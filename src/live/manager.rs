use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::AbortHandle;

use crate::auth::AuthSession;
use crate::db::{documents, DbPool};
use crate::live::broker::ChangeBroker;
use crate::live::query::{LiveQuery, QueryKey};

/// The full ordered result set of a live query at one point in time.
pub type Snapshot = Vec<Value>;

type SnapshotCallback = Arc<dyn Fn(Snapshot) + Send + Sync>;

struct ActiveEntry {
    generation: u64,
    abort: AbortHandle,
}

type Registry = Arc<Mutex<HashMap<QueryKey, ActiveEntry>>>;

/// Owns every live subscription. Guarantees at most one active
/// subscription per logical query key; subscribing an already-active key
/// supersedes the previous listener instead of stacking a duplicate.
#[derive(Clone)]
pub struct SubscriptionManager {
    db: DbPool,
    broker: ChangeBroker,
    active: Registry,
    generation: Arc<AtomicU64>,
}

impl SubscriptionManager {
    pub fn new(db: DbPool, broker: ChangeBroker) -> Self {
        Self {
            db,
            broker,
            active: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Open a live subscription. The callback receives the full ordered
    /// snapshot immediately, and again after every committed write that
    /// may affect the query. With nobody signed in the snapshot is empty
    /// rather than an error; when the session's user changes, the query
    /// re-runs against the new user's data.
    ///
    /// Delivery is asynchronous: a write acknowledged by the gateway is
    /// observed by the callback eventually, not synchronously.
    pub fn subscribe<F>(
        &self,
        session: &AuthSession,
        query: LiveQuery,
        on_snapshot: F,
    ) -> SubscriptionHandle
    where
        F: Fn(Snapshot) + Send + Sync + 'static,
    {
        let key = query.key().scoped(session.session_id());
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let callback: SnapshotCallback = Arc::new(on_snapshot);

        let db = self.db.clone();
        let mut changes = self.broker.subscribe();
        let mut auth_rx = session.watch();

        let task_query = query.clone();
        let task = tokio::spawn(async move {
            let mut user_id = auth_rx.borrow().clone();
            deliver(&db, &task_query, user_id.as_deref(), &callback);

            loop {
                tokio::select! {
                    event = changes.recv() => match event {
                        Ok(ev) => {
                            if ev.collection != task_query.collection {
                                continue;
                            }
                            if user_id.as_deref() != Some(ev.user_id.as_str()) {
                                continue;
                            }
                            deliver(&db, &task_query, user_id.as_deref(), &callback);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            // Missed events; the snapshot may be stale, so
                            // resync from the store unconditionally.
                            tracing::warn!(skipped, "Live query lagged, resyncing");
                            deliver(&db, &task_query, user_id.as_deref(), &callback);
                        }
                        Err(RecvError::Closed) => break,
                    },
                    changed = auth_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        user_id = auth_rx.borrow().clone();
                        tracing::debug!(
                            collection = task_query.collection.as_str(),
                            signed_in = user_id.is_some(),
                            "Auth changed, re-subscribing"
                        );
                        deliver(&db, &task_query, user_id.as_deref(), &callback);
                    }
                }
            }
        });

        let mut registry = self.active.lock().expect("subscription registry poisoned");
        if let Some(previous) = registry.insert(
            key.clone(),
            ActiveEntry {
                generation,
                abort: task.abort_handle(),
            },
        ) {
            tracing::debug!(query = %key, "Superseding existing subscription");
            previous.abort.abort();
        }

        SubscriptionHandle {
            key,
            generation,
            registry: Arc::clone(&self.active),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of currently active subscriptions, for tests and
    /// diagnostics.
    pub fn active_count(&self) -> usize {
        self.active.lock().expect("subscription registry poisoned").len()
    }
}

/// Run the query and hand the result to the callback. Store failures are
/// logged and the delivery skipped; a live view must never crash over a
/// transient query error.
fn deliver(db: &DbPool, query: &LiveQuery, user_id: Option<&str>, callback: &SnapshotCallback) {
    let Some(user_id) = user_id else {
        callback(Vec::new());
        return;
    };

    let snapshot = db
        .get()
        .map_err(crate::error::AppError::from)
        .and_then(|conn| documents::fetch(&conn, query, user_id).map_err(Into::into));

    match snapshot {
        Ok(docs) => callback(docs),
        Err(e) => tracing::error!(
            collection = query.collection.as_str(),
            error = %e,
            "Snapshot delivery failed"
        ),
    }
}

/// Teardown handle for one subscription. `unsubscribe` is idempotent and
/// also runs on drop, so a handle going out of scope cannot leak a
/// listener.
pub struct SubscriptionHandle {
    key: QueryKey,
    generation: u64,
    registry: Registry,
    closed: AtomicBool,
}

impl SubscriptionHandle {
    pub fn unsubscribe(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut registry = self.registry.lock().expect("subscription registry poisoned");
        // Only tear down the entry we created; a superseding subscription
        // under the same key belongs to a newer handle.
        if let Some(entry) = registry.get(&self.key) {
            if entry.generation == self.generation {
                entry.abort.abort();
                registry.remove(&self.key);
                tracing::debug!(query = %self.key, "Unsubscribed");
            }
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
