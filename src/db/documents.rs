use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use serde_json::Value;
use tracing::{debug, trace};

use crate::live::query::{Collection, LiveQuery, OrderBy};

/// A document as the store sees it: the JSON body plus the indexed
/// columns that scope and order it. The body carries the full record
/// (including id and timestamps); the columns exist for querying.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: Value,
}

/// Convert a JSON filter value into a SQL parameter matching what
/// `json_extract` yields for the same field.
fn json_param(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as SqlValue;

    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else {
                SqlValue::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

pub fn insert_document(conn: &Connection, collection: Collection, doc: &RawDocument) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO documents (id, collection, user_id, body, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            doc.id,
            collection.as_str(),
            doc.user_id,
            doc.body.to_string(),
            doc.created_at.to_rfc3339(),
            doc.updated_at.to_rfc3339(),
        ],
    )?;

    debug!(
        collection = collection.as_str(),
        document_id = %doc.id,
        "Created document"
    );
    Ok(())
}

/// Replace the body of an existing document. Returns the number of rows
/// touched; zero means the document does not exist under that scope.
pub fn replace_document(
    conn: &Connection,
    collection: Collection,
    user_id: &str,
    id: &str,
    updated_at: DateTime<Utc>,
    body: &Value,
) -> rusqlite::Result<usize> {
    let rows = conn.execute(
        "UPDATE documents SET body = ?, updated_at = ?
         WHERE collection = ? AND user_id = ? AND id = ?",
        params![
            body.to_string(),
            updated_at.to_rfc3339(),
            collection.as_str(),
            user_id,
            id,
        ],
    )?;

    if rows > 0 {
        debug!(
            collection = collection.as_str(),
            document_id = id,
            "Updated document"
        );
    }
    Ok(rows)
}

pub fn upsert_document(conn: &Connection, collection: Collection, doc: &RawDocument) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO documents (id, collection, user_id, body, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
        params![
            doc.id,
            collection.as_str(),
            doc.user_id,
            doc.body.to_string(),
            doc.created_at.to_rfc3339(),
            doc.updated_at.to_rfc3339(),
        ],
    )?;

    debug!(
        collection = collection.as_str(),
        document_id = %doc.id,
        "Upserted document"
    );
    Ok(())
}

pub fn delete_document(
    conn: &Connection,
    collection: Collection,
    user_id: &str,
    id: &str,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "DELETE FROM documents WHERE collection = ? AND user_id = ? AND id = ?",
        params![collection.as_str(), user_id, id],
    )?;

    if rows > 0 {
        debug!(
            collection = collection.as_str(),
            document_id = id,
            "Deleted document"
        );
    }
    Ok(rows > 0)
}

pub fn get_document(
    conn: &Connection,
    collection: Collection,
    user_id: &str,
    id: &str,
) -> rusqlite::Result<Option<Value>> {
    trace!(
        collection = collection.as_str(),
        document_id = id,
        "Fetching document"
    );
    conn.query_row(
        "SELECT body FROM documents WHERE collection = ? AND user_id = ? AND id = ?",
        params![collection.as_str(), user_id, id],
        |row| {
            let body: String = row.get(0)?;
            Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
        },
    )
    .optional()
}

/// Run a declarative query for one user and return the ordered document
/// bodies. Equality predicates are evaluated against top-level JSON
/// fields with `json_extract`.
pub fn fetch(conn: &Connection, query: &LiveQuery, user_id: &str) -> rusqlite::Result<Vec<Value>> {
    let mut sql = String::from(
        "SELECT body FROM documents WHERE collection = ? AND user_id = ?",
    );
    let mut params_vec: Vec<Box<dyn ToSql>> = vec![
        Box::new(query.collection.as_str()),
        Box::new(user_id.to_string()),
    ];

    for filter in &query.filters {
        sql.push_str(" AND json_extract(body, ?) = ?");
        params_vec.push(Box::new(format!("$.{}", filter.field)));
        params_vec.push(Box::new(json_param(&filter.value)));
    }

    match query.order {
        OrderBy::CreatedAtAsc => sql.push_str(" ORDER BY created_at ASC, id ASC"),
        OrderBy::CreatedAtDesc => sql.push_str(" ORDER BY created_at DESC, id DESC"),
    }

    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt.query_map(params_refs.as_slice(), |row| {
        let body: String = row.get(0)?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    })?;

    let documents: Vec<Value> = rows.filter_map(|r| r.ok()).collect();
    trace!(
        collection = query.collection.as_str(),
        count = documents.len(),
        "Fetched snapshot"
    );
    Ok(documents)
}

/// Typed variant of [`fetch`]. Bodies that no longer deserialize into the
/// expected shape are dropped with a warning rather than failing the
/// whole snapshot.
pub fn fetch_records<R: serde::de::DeserializeOwned>(
    conn: &Connection,
    query: &LiveQuery,
    user_id: &str,
) -> rusqlite::Result<Vec<R>> {
    let records = fetch(conn, query, user_id)?
        .into_iter()
        .filter_map(|body| match serde_json::from_value(body) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    collection = query.collection.as_str(),
                    error = %e,
                    "Skipping malformed document"
                );
                None
            }
        })
        .collect();
    Ok(records)
}
