use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::error::AppResult;

/// Apply every pending `.sql` script from the migrations directory, in
/// file name order. Applied scripts are recorded by name in the
/// `_migrations` table and never re-run.
pub fn run_migrations(conn: &Connection, migrations_dir: &Path) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let mut scripts: Vec<_> = fs::read_dir(migrations_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    scripts.sort();

    let mut applied = 0;
    for path in scripts {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let seen: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE name = ?)",
            [&name],
            |row| row.get(0),
        )?;
        if seen {
            continue;
        }

        tracing::info!(migration = %name, "Applying migration");
        conn.execute_batch(&fs::read_to_string(&path)?)?;
        conn.execute("INSERT INTO _migrations (name) VALUES (?)", [&name])?;
        applied += 1;
    }

    if applied > 0 {
        tracing::info!(count = applied, "Applied pending migrations");
    } else {
        tracing::debug!("No new migrations to apply");
    }

    Ok(())
}
