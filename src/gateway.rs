use chrono::Utc;
use serde_json::Value;

use crate::db::documents::{self, RawDocument};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::live::broker::{ChangeBroker, ChangeEvent};
use crate::live::query::Collection;
use crate::models::Record;

/// Write path for every collection. Each successful write refreshes the
/// record's `updatedAt` and publishes a change event so live queries
/// redeliver. Failures map straight to the persistence error variants;
/// nothing is retried, and callers hold no optimistic state to roll back.
#[derive(Clone)]
pub struct MutationGateway {
    db: DbPool,
    broker: ChangeBroker,
}

impl MutationGateway {
    pub fn new(db: DbPool, broker: ChangeBroker) -> Self {
        Self { db, broker }
    }

    pub fn create<R: Record>(&self, record: &mut R) -> AppResult<()> {
        record.touch(Utc::now());

        let conn = self.db.get()?;
        documents::insert_document(&conn, R::COLLECTION, &to_raw(record)?)?;

        self.publish(R::COLLECTION, record.user_id());
        Ok(())
    }

    /// Replace an existing document with a new body. The document must
    /// already exist under the record's owner.
    pub fn update<R: Record>(&self, record: &mut R) -> AppResult<()> {
        let now = Utc::now();
        record.touch(now);

        let conn = self.db.get()?;
        let body = to_body(record)?;
        let rows = documents::replace_document(
            &conn,
            R::COLLECTION,
            record.user_id(),
            record.id(),
            now,
            &body,
        )?;

        if rows == 0 {
            return Err(AppError::NotFound(format!(
                "No {} document with id {}",
                R::COLLECTION.as_str(),
                record.id()
            )));
        }

        self.publish(R::COLLECTION, record.user_id());
        Ok(())
    }

    /// Insert-or-replace, used for the one-per-user settings document.
    pub fn upsert<R: Record>(&self, record: &mut R) -> AppResult<()> {
        record.touch(Utc::now());

        let conn = self.db.get()?;
        documents::upsert_document(&conn, R::COLLECTION, &to_raw(record)?)?;

        self.publish(R::COLLECTION, record.user_id());
        Ok(())
    }

    /// Delete by id. Returns whether anything was removed. Dangling
    /// references from other collections are left as they are.
    pub fn delete(&self, collection: Collection, user_id: &str, id: &str) -> AppResult<bool> {
        let conn = self.db.get()?;
        let deleted = documents::delete_document(&conn, collection, user_id, id)?;

        if deleted {
            self.publish(collection, user_id);
        }
        Ok(deleted)
    }

    fn publish(&self, collection: Collection, user_id: &str) {
        self.broker.publish(ChangeEvent {
            collection,
            user_id: user_id.to_string(),
        });
    }
}

fn to_body<R: Record>(record: &R) -> AppResult<Value> {
    serde_json::to_value(record)
        .map_err(|e| AppError::Internal(format!("Failed to serialize record: {}", e)))
}

fn to_raw<R: Record>(record: &R) -> AppResult<RawDocument> {
    Ok(RawDocument {
        id: record.id().to_string(),
        user_id: record.user_id().to_string(),
        created_at: record.created_at(),
        updated_at: Utc::now(),
        body: to_body(record)?,
    })
}
