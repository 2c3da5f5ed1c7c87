use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn create_pool(database_path: &Path) -> Result<DbPool, r2d2::Error> {
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
        )
    });

    Pool::builder().max_size(10).build(manager)
}

/// In-memory database for tests. Each call gets its own uniquely named
/// shared-cache database so pooled connections see the same data while
/// parallel tests stay isolated.
pub fn create_in_memory_pool() -> Result<DbPool, r2d2::Error> {
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_DB_ID: AtomicU64 = AtomicU64::new(0);
    let id = NEXT_DB_ID.fetch_add(1, Ordering::Relaxed);

    let uri = format!("file:memdb{}?mode=memory&cache=shared", id);
    let manager = SqliteConnectionManager::file(uri)
        .with_flags(
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    Pool::builder().max_size(2).build(manager)
}
